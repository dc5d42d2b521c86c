//! Content-based format detection
//!
//! The file name is never consulted. Compound files are told apart by their
//! well-known streams, OOXML packages by the content type of their main part.

use std::{fs::File, io::Read, path::Path};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;
use zip::ZipArchive;

use super::compound::{CompoundDocument, CFB_MAGIC};
use super::ooxml::Package;
use crate::error::Result;
use crate::types::FormatTag;
use crate::utils::read_head;

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const HEAD_LEN: usize = 64 * 1024;

/// Word FIB identifier of Word 97 and later
pub const FIB_IDENT: u16 = 0xA5EC;
/// `fDot` bit of the FIB flags word
pub const FIB_FLAG_DOT: u16 = 0x0001;
/// `fEncrypted` bit of the FIB flags word
pub const FIB_FLAG_ENCRYPTED: u16 = 0x0100;

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Detects the container format of `path` from its content.
///
/// Returns `None` when the content matches no known office format.
pub fn detect_format(path: &Path) -> Result<Option<FormatTag>> {
    let head = read_head(path, HEAD_LEN)?;
    let format = if head.starts_with(&CFB_MAGIC) {
        sniff_compound(path)?
    } else if head.starts_with(&ZIP_MAGIC) {
        sniff_zip(path)
    } else {
        sniff_text(&head)
    };
    debug!("Sniffed {} as {:?}", path.display(), format);
    Ok(format)
}

fn sniff_compound(path: &Path) -> Result<Option<FormatTag>> {
    let Ok(mut file) = CompoundDocument::open(path) else {
        return Ok(None);
    };
    if file.has_stream("/EncryptedPackage") {
        return Ok(Some(FormatTag::EncryptedPackage));
    }
    if file.has_stream("/WordDocument") {
        let fib = file.read_stream("/WordDocument", 12)?;
        let is_template = fib_header(&fib).map_or(false, |(_, flags)| flags & FIB_FLAG_DOT != 0);
        return Ok(Some(if is_template { FormatTag::Dot } else { FormatTag::Doc }));
    }
    if file.has_stream("/Workbook") || file.has_stream("/Book") {
        return Ok(Some(FormatTag::Xls));
    }
    if file.has_stream("/PowerPoint Document") {
        return Ok(Some(FormatTag::Ppt));
    }
    Ok(None)
}

fn sniff_zip(path: &Path) -> Option<FormatTag> {
    if let Ok(package) = Package::open(path) {
        if let Some(format) = package.main_format() {
            return Some(format);
        }
    }
    sniff_opendocument(path)
}

fn sniff_opendocument(path: &Path) -> Option<FormatTag> {
    let file = File::open(path).ok()?;
    let mut archive = ZipArchive::new(file).ok()?;
    let mut mimetype = String::new();
    archive
        .by_name("mimetype")
        .ok()?
        .take(256)
        .read_to_string(&mut mimetype)
        .ok()?;
    match mimetype.trim() {
        "application/vnd.oasis.opendocument.spreadsheet" => Some(FormatTag::Ods),
        "application/vnd.oasis.opendocument.text" => Some(FormatTag::Odt),
        "application/vnd.oasis.opendocument.presentation" => Some(FormatTag::Odp),
        _ => None,
    }
}

/// Text-based formats: RTF, MHTML and the flat XML formats
pub fn sniff_text(head: &[u8]) -> Option<FormatTag> {
    let head = head.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(head);
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
    let head = &head[start..];

    if head.starts_with(b"{\\rtf") {
        return Some(FormatTag::Rtf);
    }
    if head.starts_with(b"<") {
        return sniff_xml_root(head);
    }
    if is_mime_message(head) {
        return Some(FormatTag::Mhtml);
    }
    None
}

fn is_mime_message(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(&head[..head.len().min(4096)]).to_ascii_lowercase();
    let headers = text
        .split("\r\n\r\n")
        .next()
        .and_then(|block| block.split("\n\n").next())
        .unwrap_or("");
    headers.starts_with("mime-version:")
        || (headers.contains("mime-version:") && headers.contains("multipart/related"))
}

fn sniff_xml_root(head: &[u8]) -> Option<FormatTag> {
    let mut reader = Reader::from_reader(head);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Start(element) | Event::Empty(element) => {
                return match element.local_name().as_ref() {
                    b"wordDocument" => Some(FormatTag::WordMl),
                    b"Workbook" => {
                        let declares_ns = element.attributes().flatten().any(|attr| {
                            attr.value.as_ref() == SPREADSHEET_NS.as_bytes()
                        });
                        declares_ns.then_some(FormatTag::SpreadsheetMl)
                    }
                    _ => None,
                };
            }
            Event::Eof => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// Extracts `(wIdent, flags)` from the start of a WordDocument stream
pub fn fib_header(fib: &[u8]) -> Option<(u16, u16)> {
    if fib.len() < 12 {
        return None;
    }
    Some((
        u16::from_le_bytes([fib[0], fib[1]]),
        u16::from_le_bytes([fib[0x0A], fib[0x0B]]),
    ))
}
