//! Scan report for the batch runner
//!
//! One entry per inspected file plus a summary, rendered as plain text or
//! JSON by [`ReportFormatter`].

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::DocumentFamily;
use crate::error::RejectionKind;
use crate::types::Verdict;

pub mod formatter;

pub use formatter::ReportFormatter;

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Outcome for one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub path: PathBuf,
    pub family: DocumentFamily,
    pub accepted: bool,
    pub rejection: Option<RejectionKind>,
    /// SHA-256 of the accepted (possibly sanitized) content
    pub sha256: Option<String>,
    pub timestamp: String,
}

/// Report summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: Option<String>,
    pub entries: Vec<ReportEntry>,
    pub summary: ReportSummary,
}

/// Report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: &Path, family: DocumentFamily, verdict: Verdict, sha256: Option<String>) {
        self.entries.push(ReportEntry {
            path: path.to_path_buf(),
            family,
            accepted: verdict.safe,
            rejection: verdict.rejection,
            sha256,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        self.update_summary();
    }

    pub fn all_accepted(&self) -> bool {
        self.entries.iter().all(|entry| entry.accepted)
    }

    /// Stamps the generation time and orders entries by path
    pub fn finish(&mut self) {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
        self.generated_at = Some(chrono::Utc::now().to_rfc3339());
    }

    fn update_summary(&mut self) {
        let accepted = self.entries.iter().filter(|entry| entry.accepted).count();
        self.summary = ReportSummary {
            total: self.entries.len(),
            accepted,
            rejected: self.entries.len() - accepted,
        };
    }
}
