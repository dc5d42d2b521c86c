//! Word 2003 XML (WordprocessingML) documents
//!
//! A single XML file. Macro projects travel base64-encoded inside
//! `w:docSuppData` (or a `w:binData` named `editdata.mso`).

use std::path::Path;

use super::xml;
use crate::error::Result;
use crate::types::EmbeddedObject;

const MACRO_DATA_NAME: &str = "editdata.mso";

#[derive(Debug)]
pub struct WordMlDocument {
    content: Vec<u8>,
}

impl WordMlDocument {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            content: crate::utils::read_file(path)?,
        })
    }

    pub fn from_bytes(content: Vec<u8>) -> Self {
        Self { content }
    }

    pub fn has_macros(&self) -> Result<bool> {
        let mut found = false;
        xml::for_each_element(&self.content[..], |element| {
            match element.local_name().as_ref() {
                b"docSuppData" => found = true,
                b"binData" => {
                    let name = xml::attribute(element, b"name")?;
                    if name.map_or(false, |n| n.eq_ignore_ascii_case(MACRO_DATA_NAME)) {
                        found = true;
                    }
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(found)
    }

    pub fn objects(&self) -> Result<Vec<EmbeddedObject>> {
        xml::scan_objects(&self.content[..], "body")
    }
}
