//! Office container readers
//!
//! Structural access to the three container families the office detectors
//! work on: OOXML zip packages, OLE2 compound files and single-file XML.
//! Nothing here renders or evaluates document content.

pub mod biff;
pub mod compound;
pub mod ooxml;
pub mod ppt;
pub mod sniff;
pub mod wordml;
pub mod xml;

use std::path::Path;

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::types::FormatTag;

pub use self::{compound::CompoundDocument, ooxml::Package, sniff::detect_format, wordml::WordMlDocument};

/// A document opened by one of the container readers
#[derive(Debug)]
pub enum OfficeDocument {
    Package {
        format: FormatTag,
        package: Package,
    },
    Compound {
        format: FormatTag,
        file: CompoundDocument,
        /// Content of the main record stream
        stream: Vec<u8>,
    },
    WordMl(WordMlDocument),
}

impl OfficeDocument {
    pub fn format(&self) -> FormatTag {
        match self {
            OfficeDocument::Package { format, .. } | OfficeDocument::Compound { format, .. } => *format,
            OfficeDocument::WordMl(_) => FormatTag::WordMl,
        }
    }
}

/// Opens `path` with the reader matching `format`.
///
/// For compound formats the main record stream is read in full.
pub fn open(path: &Path, format: FormatTag) -> Result<OfficeDocument> {
    if format.is_ooxml() {
        let package = Package::open(path)?;
        return Ok(OfficeDocument::Package { format, package });
    }
    let main_stream = match format {
        FormatTag::Xls => None,
        FormatTag::Doc | FormatTag::Dot => Some("/WordDocument"),
        FormatTag::Ppt => Some("/PowerPoint Document"),
        FormatTag::WordMl => return Ok(OfficeDocument::WordMl(WordMlDocument::open(path)?)),
        FormatTag::EncryptedPackage => {
            return Err(ParseError::Encrypted("password-protected OOXML package".into()).into())
        }
        other => {
            return Err(ParseError::Unsupported(format!("no structural reader for {} documents", other)).into())
        }
    };
    let mut file = CompoundDocument::open(path)?;
    let stream_name = match main_stream {
        Some(name) => name,
        // BIFF5 files name the workbook stream "Book"
        None if file.has_stream("/Workbook") => "/Workbook",
        None => "/Book",
    };
    let stream = file.read_full_stream(stream_name)?;
    debug!("Loaded {} stream {} ({} bytes)", format, stream_name, stream.len());
    Ok(OfficeDocument::Compound { format, file, stream })
}
