//! Family selection for the caller's type tag
//!
//! The family is resolved once, at the boundary, into an [`Inspector`] that
//! carries its detector or sanitizer. Nothing below re-dispatches.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::detector::{DocumentDetector, PdfDetector, PresentationDetector, SpreadsheetDetector, WordDetector};
use crate::sanitizer::{DocumentSanitizer, ImageSanitizer};
use crate::types::Verdict;

/// Document family declared by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFamily {
    Spreadsheet,
    Word,
    Presentation,
    Pdf,
    Image,
}

impl DocumentFamily {
    pub const ALL: [DocumentFamily; 5] = [
        DocumentFamily::Spreadsheet,
        DocumentFamily::Word,
        DocumentFamily::Presentation,
        DocumentFamily::Pdf,
        DocumentFamily::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFamily::Spreadsheet => "spreadsheet",
            DocumentFamily::Word => "word",
            DocumentFamily::Presentation => "presentation",
            DocumentFamily::Pdf => "pdf",
            DocumentFamily::Image => "image",
        }
    }
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document family: {0}")]
pub struct UnknownFamily(pub String);

impl FromStr for DocumentFamily {
    type Err = UnknownFamily;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "EXCEL" | "SPREADSHEET" => Ok(DocumentFamily::Spreadsheet),
            "WORD" => Ok(DocumentFamily::Word),
            "POWERPOINT" | "PRESENTATION" => Ok(DocumentFamily::Presentation),
            "PDF" => Ok(DocumentFamily::Pdf),
            "IMAGE" => Ok(DocumentFamily::Image),
            _ => Err(UnknownFamily(tag.to_string())),
        }
    }
}

/// One variant per family, each carrying its checker
pub enum Inspector {
    Spreadsheet(SpreadsheetDetector),
    Word(WordDetector),
    Presentation(PresentationDetector),
    Pdf(PdfDetector),
    Image(ImageSanitizer),
}

impl Inspector {
    pub fn new(family: DocumentFamily, config: &ScanConfig) -> Self {
        match family {
            DocumentFamily::Spreadsheet => Inspector::Spreadsheet(SpreadsheetDetector::new(config)),
            DocumentFamily::Word => Inspector::Word(WordDetector::new(config)),
            DocumentFamily::Presentation => Inspector::Presentation(PresentationDetector::new(config)),
            DocumentFamily::Pdf => Inspector::Pdf(PdfDetector::new(config)),
            DocumentFamily::Image => Inspector::Image(ImageSanitizer::new(config)),
        }
    }

    pub fn family(&self) -> DocumentFamily {
        match self {
            Inspector::Spreadsheet(_) => DocumentFamily::Spreadsheet,
            Inspector::Word(_) => DocumentFamily::Word,
            Inspector::Presentation(_) => DocumentFamily::Presentation,
            Inspector::Pdf(_) => DocumentFamily::Pdf,
            Inspector::Image(_) => DocumentFamily::Image,
        }
    }

    /// `true` when the file may be kept. Images are rewritten in place first.
    pub fn accept(&self, path: &Path) -> bool {
        match self {
            Inspector::Spreadsheet(detector) => detector.is_safe(path),
            Inspector::Word(detector) => detector.is_safe(path),
            Inspector::Presentation(detector) => detector.is_safe(path),
            Inspector::Pdf(detector) => detector.is_safe(path),
            Inspector::Image(sanitizer) => sanitizer.made_safe(path),
        }
    }

    /// Like [`accept`](Self::accept) but keeps the rejection kind
    pub fn evaluate(&self, path: &Path) -> Verdict {
        let outcome = match self {
            Inspector::Spreadsheet(detector) => detector.inspect(path),
            Inspector::Word(detector) => detector.inspect(path),
            Inspector::Presentation(detector) => detector.inspect(path),
            Inspector::Pdf(detector) => detector.inspect(path),
            Inspector::Image(sanitizer) => sanitizer.sanitize(path),
        };
        if let Err(e) = &outcome {
            tracing::warn!(family = %self.family(), kind = %e.kind(), "{} rejected: {}", path.display(), e);
        }
        Verdict::from(&outcome)
    }
}
