//! BIFF8 workbook stream walker
//!
//! Only the records needed to locate sheets, macro sheets and drawing
//! objects are interpreted. Everything else is skipped by length.

use tracing::trace;

use crate::error::{ParseError, Result};
use crate::types::EmbeddedObject;

pub const RT_BOF: u16 = 0x0809;
pub const RT_EOF: u16 = 0x000A;
pub const RT_FILEPASS: u16 = 0x002F;
pub const RT_BOUNDSHEET: u16 = 0x0085;
pub const RT_OBJ: u16 = 0x005D;

// Obj sub-records
const FT_END: u16 = 0x0000;
const FT_PICT_FMLA: u16 = 0x0009;
const FT_CMO: u16 = 0x0015;

// Obj types
const OT_PICTURE: u16 = 0x0008;
const OT_LIST: u16 = 0x0012;

// BoundSheet8 dt values
const DT_MACRO_SHEET: u8 = 0x01;
const DT_VBA_MODULE: u8 = 0x06;

/// Nesting bound for BOF/EOF substreams (charts embed substreams in sheets)
const MAX_SUBSTREAM_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub offset: usize,
    pub kind: u16,
    pub data: &'a [u8],
}

impl Record<'_> {
    /// Offset just past the record
    pub fn end(&self) -> usize {
        self.offset + 4 + self.data.len()
    }
}

/// Iterator over the records of a byte range
pub struct Records<'a> {
    stream: &'a [u8],
    pos: usize,
    end: usize,
    failed: bool,
}

impl<'a> Records<'a> {
    pub fn new(stream: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            stream,
            pos: start,
            end: end.min(stream.len()),
            failed: false,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.end {
            return None;
        }
        if self.end - self.pos < 4 {
            self.failed = true;
            return Some(Err(ParseError::Truncated(format!("record header at {:#x}", self.pos)).into()));
        }
        let kind = u16::from_le_bytes([self.stream[self.pos], self.stream[self.pos + 1]]);
        let len = u16::from_le_bytes([self.stream[self.pos + 2], self.stream[self.pos + 3]]) as usize;
        let data_start = self.pos + 4;
        if data_start + len > self.end {
            self.failed = true;
            return Some(Err(ParseError::Truncated(format!(
                "record {:#06x} at {:#x} overruns stream",
                kind, self.pos
            ))
            .into()));
        }
        let record = Record {
            offset: self.pos,
            kind,
            data: &self.stream[data_start..data_start + len],
        };
        self.pos = data_start + len;
        Some(Ok(record))
    }
}

/// One worksheet-level substream of the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetStream {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// What the workbook globals and substream walk revealed
#[derive(Debug, Default)]
pub struct WorkbookLayout {
    pub sheets: Vec<SheetStream>,
    /// Count of BoundSheet8 entries declaring an XLM macro sheet or a VBA module
    pub macro_sheets: usize,
}

struct BoundSheet {
    name: String,
    dt: u8,
}

fn parse_boundsheet(data: &[u8]) -> Result<BoundSheet> {
    if data.len() < 8 {
        return Err(ParseError::Truncated("BoundSheet8 record".into()).into());
    }
    let dt = data[5];
    let cch = data[6] as usize;
    let high_byte = data[7] & 0x01 != 0;
    let chars = &data[8..];
    let name = if high_byte {
        let units: Vec<u16> = chars
            .chunks_exact(2)
            .take(cch)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        chars.iter().take(cch).map(|&b| b as char).collect()
    };
    Ok(BoundSheet { name, dt })
}

/// Walks the globals substream and splits the rest of the stream into sheets.
///
/// Fails on a stream that does not open with BOF and on an encrypted workbook.
pub fn scan_workbook(stream: &[u8]) -> Result<WorkbookLayout> {
    let mut records = Records::new(stream, 0, stream.len());
    match records.next() {
        Some(Ok(record)) if record.kind == RT_BOF => {}
        Some(Err(e)) => return Err(e),
        _ => return Err(ParseError::Container("workbook stream does not start with BOF".into()).into()),
    }

    let mut layout = WorkbookLayout::default();
    let mut bound_sheets = Vec::new();
    let mut globals_end = None;
    for record in records.by_ref() {
        let record = record?;
        match record.kind {
            RT_FILEPASS => return Err(ParseError::Encrypted("workbook FilePass record".into()).into()),
            RT_BOUNDSHEET => {
                let sheet = parse_boundsheet(record.data)?;
                if sheet.dt == DT_MACRO_SHEET || sheet.dt == DT_VBA_MODULE {
                    layout.macro_sheets += 1;
                }
                bound_sheets.push(sheet);
            }
            RT_EOF => {
                globals_end = Some(record.end());
                break;
            }
            _ => {}
        }
    }
    let Some(mut pos) = globals_end else {
        return Err(ParseError::Truncated("workbook globals have no EOF".into()).into());
    };

    // Sheet substreams follow the globals in BoundSheet8 order
    let mut index = 0;
    while pos < stream.len() {
        let mut records = Records::new(stream, pos, stream.len());
        let first = match records.next() {
            Some(record) => record?,
            None => break,
        };
        if first.kind != RT_BOF {
            // Padding after the last substream
            if stream[pos..].iter().all(|&b| b == 0) {
                break;
            }
            return Err(ParseError::Container(format!("expected BOF at {:#x}", pos)).into());
        }
        let mut depth = 1;
        let mut end = None;
        for record in records {
            let record = record?;
            match record.kind {
                RT_BOF => {
                    depth += 1;
                    if depth > MAX_SUBSTREAM_DEPTH {
                        return Err(ParseError::Unsupported("substream nesting too deep".into()).into());
                    }
                }
                RT_EOF => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(record.end());
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return Err(ParseError::Truncated(format!("substream at {:#x} has no EOF", pos)).into());
        };
        let name = bound_sheets
            .get(index)
            .map(|sheet| sheet.name.clone())
            .unwrap_or_else(|| format!("Sheet{}", index + 1));
        trace!("Sheet substream {} at {:#x}..{:#x}", name, pos, end);
        layout.sheets.push(SheetStream { name, start: pos, end });
        index += 1;
        pos = end;
    }
    Ok(layout)
}

/// Classifies one Obj record.
///
/// A picture carrying an ftPictFmla sub-record is an OLE object; every other
/// object type is drawn by the spreadsheet itself.
pub fn classify_obj(data: &[u8]) -> Option<EmbeddedObject> {
    if data.len() < 6 {
        return None;
    }
    let ft = u16::from_le_bytes([data[0], data[1]]);
    let cb = u16::from_le_bytes([data[2], data[3]]) as usize;
    if ft != FT_CMO || cb < 2 {
        return None;
    }
    let ot = u16::from_le_bytes([data[4], data[5]]);
    if ot == OT_PICTURE {
        let mut pos = 4 + cb;
        while pos + 4 <= data.len() {
            let ft = u16::from_le_bytes([data[pos], data[pos + 1]]);
            let cb = u16::from_le_bytes([data[pos + 2], data[pos + 3]]) as usize;
            match ft {
                FT_END => break,
                FT_PICT_FMLA => return Some(EmbeddedObject::foreign("Obj picture with ftPictFmla")),
                _ => {}
            }
            pos += 4 + cb;
        }
        return Some(EmbeddedObject::native("Obj picture"));
    }
    if ot == OT_LIST {
        // ftLbsData has no length field of its own; nothing after it matters
        return Some(EmbeddedObject::native("Obj list box"));
    }
    Some(EmbeddedObject::native(format!("Obj type {:#06x}", ot)))
}

/// Object descriptors of one sheet substream
pub fn sheet_objects(stream: &[u8], sheet: &SheetStream) -> Result<Vec<EmbeddedObject>> {
    let mut objects = Vec::new();
    for record in Records::new(stream, sheet.start, sheet.end) {
        let record = record?;
        if record.kind == RT_OBJ {
            if let Some(mut object) = classify_obj(record.data) {
                object.origin = format!("{}: {}", sheet.name, object.origin);
                objects.push(object);
            }
        }
    }
    Ok(objects)
}
