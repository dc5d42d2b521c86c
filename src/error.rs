//! Error types and rejection classification for document inspection
//!
//! Every failure inside a detector or sanitizer is one of these variants.
//! The public contract reduces all of them to `false`; the variant survives
//! only in logs, reports and tests through [`Error::kind`].

use std::{io, result::Result as StdResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Custom result type for inspection operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for inspection operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("File access error: {0}")]
    FileAccess(String),

    #[error("Format rejected: {0}")]
    FormatRejected(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Policy violation: {0}")]
    Policy(#[from] PolicyViolation),

    #[error("Codec unsupported: {0}")]
    CodecUnsupported(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Coarse classification of why a file was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionKind {
    FileAccess,
    FormatRejected,
    ParseFailed,
    PolicyViolation,
    CodecUnsupported,
}

impl Error {
    /// Maps the error onto its rejection category
    pub fn kind(&self) -> RejectionKind {
        match self {
            Error::FileAccess(_) | Error::IoError(_) => RejectionKind::FileAccess,
            Error::FormatRejected(_) => RejectionKind::FormatRejected,
            Error::Parse(_) => RejectionKind::ParseFailed,
            Error::Policy(_) => RejectionKind::PolicyViolation,
            Error::CodecUnsupported(_) => RejectionKind::CodecUnsupported,
        }
    }
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RejectionKind::FileAccess => "file-access",
            RejectionKind::FormatRejected => "format-rejected",
            RejectionKind::ParseFailed => "parse-failed",
            RejectionKind::PolicyViolation => "policy-violation",
            RejectionKind::CodecUnsupported => "codec-unsupported",
        };
        f.write_str(label)
    }
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    #[error("Invalid container: {0}")]
    Container(String),

    #[error("Truncated structure: {0}")]
    Truncated(String),

    #[error("Encrypted content: {0}")]
    Encrypted(String),

    #[error("Unsupported content: {0}")]
    Unsupported(String),

    #[error("PDF parser: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Image decoder: {0}")]
    Image(#[from] image::ImageError),

    #[error("Zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML reader: {0}")]
    Xml(#[from] quick_xml::Error),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PolicyViolation {
    #[error("macro code present in {format} document")]
    MacroPresent { format: String },

    #[error("{count} foreign embedded object(s) found")]
    EmbeddedObjects { count: usize },

    #[error("document-level script present ({length} bytes)")]
    ScriptPresent { length: usize },

    #[error("{count} embedded file attachment(s) found")]
    EmbeddedFiles { count: usize },
}
