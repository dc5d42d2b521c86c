//! Word-processor detector

use std::path::Path;

use tracing::debug;

use super::{FormatParser, FormatPolicy, OfficeDetector};
use crate::config::ScanConfig;
use crate::error::{ParseError, Result};
use crate::office::{self, sniff, OfficeDocument};
use crate::types::{Container, ContainerLocation, EmbeddedObject, FormatTag};

pub const ALLOWED_FORMATS: &[&str] = &["doc", "docx", "docm", "wml", "dot", "dotm"];

/// MHTML documents are refused outright: their macro state cannot be verified
pub const ALWAYS_REJECTED: &[&str] = &["mht"];

pub const POLICY: FormatPolicy = FormatPolicy {
    allowed: Some(ALLOWED_FORMATS),
    always_rejected: ALWAYS_REJECTED,
};

const MACROS_STORAGE: &str = "/Macros";
const OBJECT_POOL: &str = "/ObjectPool";

/// Content types of parts that can host drawings and objects
const PART_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    "application/vnd.ms-word.document.macroEnabled.main+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml",
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.endnotes+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.glossary+xml",
];

pub type WordDetector = OfficeDetector<WordParser>;

impl OfficeDetector<WordParser> {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_parser(WordParser, POLICY, config)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WordParser;

impl FormatParser for WordParser {
    fn family(&self) -> &'static str {
        "word"
    }

    fn load(&self, path: &Path, format: FormatTag) -> Result<OfficeDocument> {
        let doc = office::open(path, format)?;
        match &doc {
            OfficeDocument::Compound {
                format: FormatTag::Doc | FormatTag::Dot,
                stream,
                ..
            } => {
                let (ident, flags) =
                    sniff::fib_header(stream).ok_or_else(|| ParseError::Truncated("WordDocument FIB".into()))?;
                if ident != sniff::FIB_IDENT {
                    return Err(ParseError::Unsupported(format!("FIB identifier {:#06x}", ident)).into());
                }
                if flags & sniff::FIB_FLAG_ENCRYPTED != 0 {
                    return Err(ParseError::Encrypted("WordDocument fEncrypted".into()).into());
                }
            }
            OfficeDocument::Package { package, .. } => {
                if package.parts_where(|ct| PART_TYPES[..4].contains(&ct)).is_empty() {
                    return Err(ParseError::Container("package has no main document part".into()).into());
                }
            }
            OfficeDocument::WordMl(_) => {}
            _ => {
                return Err(ParseError::Unsupported(format!("{} is not a word-processor document", doc.format())).into());
            }
        }
        Ok(doc)
    }

    fn has_macros(&self, doc: &mut OfficeDocument) -> Result<bool> {
        match doc {
            OfficeDocument::Package { package, .. } => Ok(package.has_vba_project()),
            OfficeDocument::Compound { file, .. } => Ok(file.has_storage(MACROS_STORAGE)),
            OfficeDocument::WordMl(wordml) => wordml.has_macros(),
        }
    }

    fn containers(&self, doc: &mut OfficeDocument) -> Result<Vec<Container>> {
        let containers = match doc {
            OfficeDocument::Package { package, .. } => package
                .parts_where(|ct| PART_TYPES.contains(&ct))
                .into_iter()
                .map(|part| Container::new(part.clone(), ContainerLocation::Part(part)))
                .collect(),
            OfficeDocument::Compound { file, .. } => {
                if file.has_storage(OBJECT_POOL) {
                    vec![Container::new("ObjectPool", ContainerLocation::Storage(OBJECT_POOL.into()))]
                } else {
                    Vec::new()
                }
            }
            OfficeDocument::WordMl(_) => vec![Container::new("body", ContainerLocation::Body)],
        };
        debug!("Word containers: {:?}", containers);
        Ok(containers)
    }

    fn embedded_objects(&self, doc: &mut OfficeDocument, container: &Container) -> Result<Vec<EmbeddedObject>> {
        match (doc, &container.location) {
            (OfficeDocument::Package { package, .. }, ContainerLocation::Part(part)) => package.scan_objects(part),
            (OfficeDocument::Compound { file, .. }, ContainerLocation::Storage(storage)) => Ok(file
                .child_storages(storage)?
                .into_iter()
                .map(|name| EmbeddedObject::foreign(format!("{}/{}", storage, name)))
                .collect()),
            (OfficeDocument::WordMl(wordml), ContainerLocation::Body) => wordml.objects(),
            _ => Err(ParseError::Unsupported(format!("container {} does not belong to this document", container.label)).into()),
        }
    }
}
