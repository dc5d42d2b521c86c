//! Spreadsheet detector
//!
//! Legacy workbooks are walked as BIFF8 record streams; OOXML workbooks
//! through their package parts.

use std::path::Path;

use tracing::debug;

use super::{FormatParser, FormatPolicy, OfficeDetector};
use crate::config::ScanConfig;
use crate::error::{ParseError, Result};
use crate::office::{self, biff, OfficeDocument};
use crate::types::{Container, ContainerLocation, EmbeddedObject, FormatTag};

pub const ALLOWED_FORMATS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "xlt", "xltm"];

pub const POLICY: FormatPolicy = FormatPolicy {
    allowed: Some(ALLOWED_FORMATS),
    always_rejected: &[],
};

const VBA_STORAGE: &str = "/_VBA_PROJECT_CUR";
/// Prefix of the root storages holding legacy embedded objects
const EMBEDDING_STORAGE_PREFIX: &str = "MBD";

const MACROSHEET_TYPES: &[&str] = &[
    "application/vnd.ms-excel.macrosheet+xml",
    "application/vnd.ms-excel.intlmacrosheet+xml",
    "application/vnd.ms-excel.macrosheet",
    "application/vnd.ms-excel.intlmacrosheet",
];

pub type SpreadsheetDetector = OfficeDetector<SpreadsheetParser>;

impl OfficeDetector<SpreadsheetParser> {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_parser(SpreadsheetParser, POLICY, config)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetParser;

fn is_sheet_type(content_type: &str) -> bool {
    content_type.contains(".worksheet")
        || content_type.contains(".chartsheet")
        || content_type.contains(".dialogsheet")
}

impl FormatParser for SpreadsheetParser {
    fn family(&self) -> &'static str {
        "spreadsheet"
    }

    fn load(&self, path: &Path, format: FormatTag) -> Result<OfficeDocument> {
        let doc = office::open(path, format)?;
        match &doc {
            OfficeDocument::Compound { format: FormatTag::Xls, stream, .. } => {
                biff::scan_workbook(stream)?;
            }
            OfficeDocument::Package { package, .. } => {
                if package.parts_where(is_sheet_type).is_empty() {
                    return Err(ParseError::Container("workbook has no sheets".into()).into());
                }
            }
            _ => {
                return Err(ParseError::Unsupported(format!("{} is not a spreadsheet", doc.format())).into());
            }
        }
        Ok(doc)
    }

    fn has_macros(&self, doc: &mut OfficeDocument) -> Result<bool> {
        match doc {
            OfficeDocument::Package { package, .. } => {
                let macro_sheets = package.parts_where(|ct| MACROSHEET_TYPES.contains(&ct));
                if !macro_sheets.is_empty() {
                    debug!("Macro sheet parts: {:?}", macro_sheets);
                }
                Ok(package.has_vba_project() || !macro_sheets.is_empty())
            }
            OfficeDocument::Compound { file, stream, .. } => {
                let layout = biff::scan_workbook(stream)?;
                Ok(file.has_storage(VBA_STORAGE) || layout.macro_sheets > 0)
            }
            OfficeDocument::WordMl(_) => Ok(false),
        }
    }

    fn containers(&self, doc: &mut OfficeDocument) -> Result<Vec<Container>> {
        match doc {
            OfficeDocument::Package { package, .. } => Ok(package
                .parts_where(is_sheet_type)
                .into_iter()
                .map(|part| Container::new(part.clone(), ContainerLocation::Part(part)))
                .collect()),
            OfficeDocument::Compound { file, stream, .. } => {
                let layout = biff::scan_workbook(stream)?;
                let mut containers: Vec<Container> = layout
                    .sheets
                    .into_iter()
                    .map(|sheet| {
                        Container::new(
                            sheet.name,
                            ContainerLocation::Records {
                                start: sheet.start,
                                end: sheet.end,
                            },
                        )
                    })
                    .collect();
                containers.extend(
                    file.root_entries()
                        .into_iter()
                        .filter(|name| name.starts_with(EMBEDDING_STORAGE_PREFIX))
                        .filter(|name| file.has_storage(&format!("/{}", name)))
                        .map(|name| Container::new(name.clone(), ContainerLocation::Storage(format!("/{}", name)))),
                );
                Ok(containers)
            }
            OfficeDocument::WordMl(_) => Ok(Vec::new()),
        }
    }

    fn embedded_objects(&self, doc: &mut OfficeDocument, container: &Container) -> Result<Vec<EmbeddedObject>> {
        match (doc, &container.location) {
            (OfficeDocument::Package { package, .. }, ContainerLocation::Part(part)) => package.scan_objects(part),
            (OfficeDocument::Compound { stream, .. }, ContainerLocation::Records { start, end }) => {
                let sheet = biff::SheetStream {
                    name: container.label.clone(),
                    start: *start,
                    end: *end,
                };
                biff::sheet_objects(stream, &sheet)
            }
            (OfficeDocument::Compound { .. }, ContainerLocation::Storage(storage)) => {
                Ok(vec![EmbeddedObject::foreign(format!("embedding storage {}", storage))])
            }
            _ => Err(ParseError::Unsupported(format!("container {} does not belong to this workbook", container.label)).into()),
        }
    }
}
