//! Presentation detector
//!
//! There is no format gate for presentations: anything that loads as one of
//! the presentation containers is judged on macros and slide objects alone.

use std::path::Path;

use super::{FormatParser, FormatPolicy, OfficeDetector};
use crate::config::ScanConfig;
use crate::error::{ParseError, Result};
use crate::office::{self, ppt, OfficeDocument};
use crate::types::{Container, ContainerLocation, EmbeddedObject, FormatTag};

pub const POLICY: FormatPolicy = FormatPolicy {
    allowed: None,
    always_rejected: &[],
};

const LOADABLE: &[FormatTag] = &[
    FormatTag::Ppt,
    FormatTag::Pptx,
    FormatTag::Pptm,
    FormatTag::Ppsx,
    FormatTag::Ppsm,
    FormatTag::Potx,
    FormatTag::Potm,
];

const ENCRYPTED_SUMMARY: &str = "/EncryptedSummary";
const SLIDE_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

pub type PresentationDetector = OfficeDetector<PresentationParser>;

impl OfficeDetector<PresentationParser> {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_parser(PresentationParser, POLICY, config)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PresentationParser;

impl FormatParser for PresentationParser {
    fn family(&self) -> &'static str {
        "presentation"
    }

    fn load(&self, path: &Path, format: FormatTag) -> Result<OfficeDocument> {
        if !LOADABLE.contains(&format) {
            return Err(ParseError::Unsupported(format!("{} is not a presentation", format)).into());
        }
        let doc = office::open(path, format)?;
        if let OfficeDocument::Compound { file, stream, .. } = &doc {
            if file.has_stream(ENCRYPTED_SUMMARY) {
                return Err(ParseError::Encrypted("EncryptedSummary stream".into()).into());
            }
            ppt::scan_presentation(stream)?;
        }
        Ok(doc)
    }

    fn has_macros(&self, doc: &mut OfficeDocument) -> Result<bool> {
        match doc {
            OfficeDocument::Package { package, .. } => Ok(package.has_vba_project()),
            OfficeDocument::Compound { stream, .. } => Ok(ppt::scan_presentation(stream)?.has_vba_info),
            OfficeDocument::WordMl(_) => Ok(false),
        }
    }

    fn containers(&self, doc: &mut OfficeDocument) -> Result<Vec<Container>> {
        match doc {
            OfficeDocument::Package { package, .. } => Ok(package
                .parts_where(|ct| ct == SLIDE_TYPE)
                .into_iter()
                .map(|part| Container::new(part.clone(), ContainerLocation::Part(part)))
                .collect()),
            OfficeDocument::Compound { stream, .. } => Ok(ppt::scan_presentation(stream)?
                .slides
                .into_iter()
                .enumerate()
                .map(|(i, (start, end))| Container::new(format!("slide {}", i + 1), ContainerLocation::Records { start, end }))
                .collect()),
            OfficeDocument::WordMl(_) => Ok(Vec::new()),
        }
    }

    fn embedded_objects(&self, doc: &mut OfficeDocument, container: &Container) -> Result<Vec<EmbeddedObject>> {
        match (doc, &container.location) {
            (OfficeDocument::Package { package, .. }, ContainerLocation::Part(part)) => package.scan_objects(part),
            (OfficeDocument::Compound { stream, .. }, ContainerLocation::Records { start, end }) => {
                ppt::slide_objects(stream, *start, *end)
            }
            _ => Err(ParseError::Unsupported(format!("container {} does not belong to this presentation", container.label)).into()),
        }
    }
}
