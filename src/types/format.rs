//! Container format tags produced by content sniffing

use std::fmt;

use serde::{Deserialize, Serialize};

/// Document format as detected from file content.
///
/// The token of a tag is the lowercase extension the format is normally
/// saved under; family allow-lists are expressed in these tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    // Legacy compound-file formats
    Xls,
    Doc,
    Dot,
    Ppt,
    // Office Open XML packages
    Xlsx,
    Xlsm,
    Xlsb,
    Xltx,
    Xltm,
    Docx,
    Docm,
    Dotx,
    Dotm,
    Pptx,
    Pptm,
    Ppsx,
    Ppsm,
    Potx,
    Potm,
    // Flat XML and text-based formats
    WordMl,
    SpreadsheetMl,
    Mhtml,
    Rtf,
    // OpenDocument packages
    Ods,
    Odt,
    Odp,
    /// Compound file wrapping an encrypted OOXML package
    EncryptedPackage,
}

impl FormatTag {
    pub fn token(&self) -> &'static str {
        match self {
            FormatTag::Xls => "xls",
            FormatTag::Doc => "doc",
            FormatTag::Dot => "dot",
            FormatTag::Ppt => "ppt",
            FormatTag::Xlsx => "xlsx",
            FormatTag::Xlsm => "xlsm",
            FormatTag::Xlsb => "xlsb",
            FormatTag::Xltx => "xltx",
            FormatTag::Xltm => "xltm",
            FormatTag::Docx => "docx",
            FormatTag::Docm => "docm",
            FormatTag::Dotx => "dotx",
            FormatTag::Dotm => "dotm",
            FormatTag::Pptx => "pptx",
            FormatTag::Pptm => "pptm",
            FormatTag::Ppsx => "ppsx",
            FormatTag::Ppsm => "ppsm",
            FormatTag::Potx => "potx",
            FormatTag::Potm => "potm",
            FormatTag::WordMl => "wml",
            FormatTag::SpreadsheetMl => "xml",
            FormatTag::Mhtml => "mht",
            FormatTag::Rtf => "rtf",
            FormatTag::Ods => "ods",
            FormatTag::Odt => "odt",
            FormatTag::Odp => "odp",
            FormatTag::EncryptedPackage => "encrypted",
        }
    }

    /// True for zip-based Office Open XML packages
    pub fn is_ooxml(&self) -> bool {
        matches!(
            self,
            FormatTag::Xlsx
                | FormatTag::Xlsm
                | FormatTag::Xlsb
                | FormatTag::Xltx
                | FormatTag::Xltm
                | FormatTag::Docx
                | FormatTag::Docm
                | FormatTag::Dotx
                | FormatTag::Dotm
                | FormatTag::Pptx
                | FormatTag::Pptm
                | FormatTag::Ppsx
                | FormatTag::Ppsm
                | FormatTag::Potx
                | FormatTag::Potm
        )
    }

    /// Maps the main-part content type of an OOXML package to its tag
    pub fn from_main_content_type(content_type: &str) -> Option<Self> {
        let tag = match content_type {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml" => FormatTag::Xlsx,
            "application/vnd.ms-excel.sheet.macroEnabled.main+xml" => FormatTag::Xlsm,
            "application/vnd.ms-excel.sheet.binary.macroEnabled.main" => FormatTag::Xlsb,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml" => FormatTag::Xltx,
            "application/vnd.ms-excel.template.macroEnabled.main+xml" => FormatTag::Xltm,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml" => FormatTag::Docx,
            "application/vnd.ms-word.document.macroEnabled.main+xml" => FormatTag::Docm,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml" => FormatTag::Dotx,
            "application/vnd.ms-word.template.macroEnabledTemplate.main+xml" => FormatTag::Dotm,
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml" => FormatTag::Pptx,
            "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml" => FormatTag::Pptm,
            "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml" => FormatTag::Ppsx,
            "application/vnd.ms-powerpoint.slideshow.macroEnabled.main+xml" => FormatTag::Ppsm,
            "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml" => FormatTag::Potx,
            "application/vnd.ms-powerpoint.template.macroEnabled.main+xml" => FormatTag::Potm,
            _ => return None,
        };
        Some(tag)
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
