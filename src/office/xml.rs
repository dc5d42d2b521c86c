//! Streaming XML element scanner shared by the OOXML and WordML readers

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{ParseError, Result};
use crate::types::{EmbeddedObject, ObjectKind};

/// Calls `visit` for every start and empty element of the document.
pub fn for_each_element<R, F>(source: R, mut visit: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(&BytesStart<'_>) -> Result<()>,
{
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(ParseError::from)? {
            Event::Start(element) | Event::Empty(element) => visit(&element)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// Value of the attribute whose local name is `local`, unescaped
pub fn attribute(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ParseError::from(quick_xml::Error::from(e)))?;
        if attr.key.local_name().as_ref() == local {
            let value = attr.unescape_value().map_err(ParseError::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Discriminates drawing-layer elements.
///
/// Covers SpreadsheetML `oleObject`/`control`, VML `OLEObject`,
/// PresentationML `oleObj`, WordprocessingML `control`/`objectEmbed`/`objectLink`
/// and the DrawingML/VML shape elements.
pub fn classify_element(local_name: &[u8]) -> Option<ObjectKind> {
    match local_name {
        b"oleObject" | b"OLEObject" | b"oleObj" | b"control" | b"objectEmbed" | b"objectLink" => {
            Some(ObjectKind::ForeignObject)
        }
        b"drawing" | b"pict" | b"sp" | b"pic" | b"graphicFrame" | b"grpSp" | b"cxnSp" | b"shape"
        | b"rect" | b"oval" | b"line" | b"group" => Some(ObjectKind::NativeDrawing),
        _ => None,
    }
}

/// Collects object descriptors for every classified element in the document
pub fn scan_objects<R: BufRead>(source: R, origin: &str) -> Result<Vec<EmbeddedObject>> {
    let mut objects = Vec::new();
    for_each_element(source, |element| {
        let local = element.local_name();
        if let Some(kind) = classify_element(local.as_ref()) {
            objects.push(EmbeddedObject {
                kind,
                origin: format!("{}:<{}>", origin, String::from_utf8_lossy(local.as_ref())),
            });
        }
        Ok(())
    })?;
    Ok(objects)
}
