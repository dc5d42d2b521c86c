//! Document detectors
//!
//! A detector answers one question about a file: is it safe to accept as-is.
//! The office detectors share a single algorithm ([`OfficeDetector`]) and
//! differ only in their [`FormatParser`] and [`FormatPolicy`].

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::config::ScanConfig;
use crate::error::{Error, ParseError, PolicyViolation, Result};
use crate::office::{self, OfficeDocument};
use crate::types::{Container, EmbeddedObject, FormatTag};
use crate::utils::ensure_readable;

pub mod pdf;
pub mod presentation;
pub mod spreadsheet;
pub mod word;

pub use self::{
    pdf::PdfDetector,
    presentation::{PresentationDetector, PresentationParser},
    spreadsheet::{SpreadsheetDetector, SpreadsheetParser},
    word::{WordDetector, WordParser},
};

/// Read-only safety check over a file
pub trait DocumentDetector: Send + Sync {
    /// Short family name used in logs
    fn name(&self) -> &'static str;

    /// Runs every check; `Ok(())` means the file is safe.
    fn inspect(&self, path: &Path) -> Result<()>;

    /// Collapses [`inspect`](Self::inspect) to a boolean. Never panics on
    /// malformed input and never modifies the file.
    fn is_safe(&self, path: &Path) -> bool {
        match self.inspect(path) {
            Ok(()) => {
                info!("{}: {} accepted", self.name(), path.display());
                true
            }
            Err(e) => {
                warn!(kind = %e.kind(), "{}: {} rejected: {}", self.name(), path.display(), e);
                false
            }
        }
    }
}

/// Family-specific structural queries used by [`OfficeDetector`]
pub trait FormatParser: Send + Sync {
    fn family(&self) -> &'static str;

    /// Content-sniffed container format, `None` when unrecognised
    fn detect_format(&self, path: &Path) -> Result<Option<FormatTag>> {
        office::detect_format(path)
    }

    /// Opens the document, failing on corrupt or encrypted content
    fn load(&self, path: &Path, format: FormatTag) -> Result<OfficeDocument>;

    fn has_macros(&self, doc: &mut OfficeDocument) -> Result<bool>;

    /// Sheets, slides or document parts, in document order
    fn containers(&self, doc: &mut OfficeDocument) -> Result<Vec<Container>>;

    fn embedded_objects(&self, doc: &mut OfficeDocument, container: &Container) -> Result<Vec<EmbeddedObject>>;
}

/// Which detected formats a family accepts for further inspection
#[derive(Debug, Clone, Copy)]
pub struct FormatPolicy {
    /// Accepted format tokens; `None` disables the gate
    pub allowed: Option<&'static [&'static str]>,
    /// Tokens refused even when the gate is disabled
    pub always_rejected: &'static [&'static str],
}

impl FormatPolicy {
    /// Applies the gate. An unrecognised format passes only when there is no
    /// allow-list; loading will then fail on it.
    pub fn admit(&self, format: Option<FormatTag>) -> Result<Option<FormatTag>> {
        if let Some(tag) = format {
            if self.always_rejected.contains(&tag.token()) {
                return Err(Error::FormatRejected(format!("{} documents are never accepted", tag)));
            }
        }
        match (self.allowed, format) {
            (None, format) => Ok(format),
            (Some(allowed), Some(tag)) if allowed.contains(&tag.token()) => Ok(Some(tag)),
            (Some(_), Some(tag)) => Err(Error::FormatRejected(format!("{} is not an accepted format", tag))),
            (Some(_), None) => Err(Error::FormatRejected("unrecognised content".into())),
        }
    }
}

/// Office detector: format gate, load, macro check, per-container object scan
pub struct OfficeDetector<P> {
    parser: P,
    policy: FormatPolicy,
    max_file_size: u64,
}

impl<P: FormatParser> OfficeDetector<P> {
    pub fn with_parser(parser: P, policy: FormatPolicy, config: &ScanConfig) -> Self {
        Self {
            parser,
            policy,
            max_file_size: config.max_file_size,
        }
    }
}

impl<P: FormatParser> DocumentDetector for OfficeDetector<P> {
    fn name(&self) -> &'static str {
        self.parser.family()
    }

    #[instrument(skip(self), fields(family = self.parser.family()))]
    fn inspect(&self, path: &Path) -> Result<()> {
        ensure_readable(path, self.max_file_size)?;

        let format = self.policy.admit(self.parser.detect_format(path)?)?;
        let format = format.ok_or_else(|| ParseError::Unsupported("unrecognised container".into()))?;
        debug!("Format {} admitted", format);

        let mut doc = self.parser.load(path, format)?;

        if self.parser.has_macros(&mut doc)? {
            return Err(PolicyViolation::MacroPresent {
                format: format.to_string(),
            }
            .into());
        }

        let containers = self.parser.containers(&mut doc)?;
        debug!("{} container(s) to scan", containers.len());
        for container in &containers {
            let objects = self.parser.embedded_objects(&mut doc, container)?;
            let foreign = objects.iter().filter(|o| o.is_foreign()).count();
            if foreign > 0 {
                debug!(
                    "{}: {} of {} object(s) are foreign",
                    container.label,
                    foreign,
                    objects.len()
                );
                return Err(PolicyViolation::EmbeddedObjects { count: foreign }.into());
            }
        }
        Ok(())
    }
}
