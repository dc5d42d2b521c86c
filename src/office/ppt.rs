//! PowerPoint binary record walker
//!
//! Records share an 8-byte header: `recVer` (4 bits) and `recInstance`
//! (12 bits), the record type and the body length. A `recVer` of `0xF`
//! marks a container whose body is itself a sequence of records.

use crate::error::{ParseError, Result};
use crate::types::EmbeddedObject;

pub const RT_SLIDE: u16 = 0x03EE;
pub const RT_VBA_INFO: u16 = 0x03FF;
pub const RT_CRYPT_SESSION: u16 = 0x2F14;
pub const RT_OFFICE_ART_FSP: u16 = 0xF00A;

/// `fOleShape` bit of the OfficeArtFSP flags
const FSP_OLE_SHAPE: u32 = 0x0000_0010;

const HEADER_LEN: usize = 8;
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub version: u8,
    pub instance: u16,
    pub kind: u16,
    pub offset: usize,
    pub body: &'a [u8],
}

impl Record<'_> {
    pub fn is_container(&self) -> bool {
        self.version == 0x0F
    }

    pub fn end(&self) -> usize {
        self.offset + HEADER_LEN + self.body.len()
    }
}

/// Splits `data` into sibling records.
///
/// With `lenient` set, a tail shorter than a header is ignored; otherwise the
/// records must cover `data` exactly.
pub fn siblings(data: &[u8], base: usize, lenient: bool) -> Result<Vec<Record<'_>>> {
    let mut records = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        if data.len() - pos < HEADER_LEN {
            if lenient {
                break;
            }
            return Err(ParseError::Truncated(format!("record header at {:#x}", base + pos)).into());
        }
        let ver_inst = u16::from_le_bytes([data[pos], data[pos + 1]]);
        let kind = u16::from_le_bytes([data[pos + 2], data[pos + 3]]);
        let len = u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]]) as usize;
        let body_start = pos + HEADER_LEN;
        if len > data.len() - body_start {
            return Err(ParseError::Truncated(format!(
                "record {:#06x} at {:#x} overruns its parent",
                kind,
                base + pos
            ))
            .into());
        }
        records.push(Record {
            version: (ver_inst & 0x000F) as u8,
            instance: ver_inst >> 4,
            kind,
            offset: base + pos,
            body: &data[body_start..body_start + len],
        });
        pos = body_start + len;
    }
    Ok(records)
}

/// Depth-first walk over `records` and the children of every container
pub fn walk<'a, F>(records: &[Record<'a>], visit: &mut F) -> Result<()>
where
    F: FnMut(&Record<'a>) -> Result<()>,
{
    walk_at(records, visit, 0)
}

fn walk_at<'a, F>(records: &[Record<'a>], visit: &mut F, depth: usize) -> Result<()>
where
    F: FnMut(&Record<'a>) -> Result<()>,
{
    if depth > MAX_DEPTH {
        return Err(ParseError::Unsupported("record nesting too deep".into()).into());
    }
    for record in records {
        visit(record)?;
        if record.is_container() {
            let children = siblings(record.body, record.offset + HEADER_LEN, false)?;
            walk_at(&children, visit, depth + 1)?;
        }
    }
    Ok(())
}

/// Summary of the `PowerPoint Document` stream
#[derive(Debug, Default)]
pub struct PresentationLayout {
    /// Byte ranges of top-level slide containers
    pub slides: Vec<(usize, usize)>,
    pub has_vba_info: bool,
}

pub fn scan_presentation(stream: &[u8]) -> Result<PresentationLayout> {
    let top = siblings(stream, 0, true)?;
    if top.is_empty() {
        return Err(ParseError::Container("empty PowerPoint Document stream".into()).into());
    }
    let mut layout = PresentationLayout::default();
    walk(&top, &mut |record| {
        match record.kind {
            RT_VBA_INFO => layout.has_vba_info = true,
            RT_CRYPT_SESSION => {
                return Err(ParseError::Encrypted("CryptSession10Container".into()).into());
            }
            _ => {}
        }
        Ok(())
    })?;
    layout.slides = top
        .iter()
        .filter(|record| record.kind == RT_SLIDE)
        .map(|record| (record.offset, record.end()))
        .collect();
    Ok(layout)
}

/// Shape descriptors inside one slide container
pub fn slide_objects(stream: &[u8], start: usize, end: usize) -> Result<Vec<EmbeddedObject>> {
    let range = stream
        .get(start..end)
        .ok_or_else(|| ParseError::Truncated(format!("slide range {:#x}..{:#x}", start, end)))?;
    let records = siblings(range, start, false)?;
    let mut objects = Vec::new();
    walk(&records, &mut |record| {
        if record.kind == RT_OFFICE_ART_FSP {
            if record.body.len() < 8 {
                return Err(ParseError::Truncated(format!("OfficeArtFSP at {:#x}", record.offset)).into());
            }
            let flags = u32::from_le_bytes([record.body[4], record.body[5], record.body[6], record.body[7]]);
            let origin = format!("OfficeArtFSP at {:#x}", record.offset);
            objects.push(if flags & FSP_OLE_SHAPE != 0 {
                EmbeddedObject::foreign(origin)
            } else {
                EmbeddedObject::native(origin)
            });
        }
        Ok(())
    })?;
    Ok(objects)
}
