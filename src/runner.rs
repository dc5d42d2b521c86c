//! Batch runner: the caller side of the inspection contract
//!
//! Every input is copied to a private working file, inspected on a blocking
//! worker and then either kept (hashed, optionally persisted to the output
//! directory) or removed. Inputs themselves are never modified.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use tempfile::{NamedTempFile, TempDir};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, info, instrument};

use crate::dispatch::Inspector;
use crate::error::{RejectionKind, Result};
use crate::report::ScanReport;
use crate::types::Verdict;
use crate::utils::{safely_remove, sha256_file};

/// Result of processing one input
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub verdict: Verdict,
    pub sha256: Option<String>,
}

pub struct BatchRunner {
    inspector: Arc<Inspector>,
    limiter: Arc<Semaphore>,
    output_dir: Option<PathBuf>,
}

impl BatchRunner {
    pub fn new(inspector: Inspector, workers: usize, output_dir: Option<PathBuf>) -> Self {
        Self {
            inspector: Arc::new(inspector),
            limiter: Arc::new(Semaphore::new(workers.max(1))),
            output_dir,
        }
    }

    /// Inspects every input and collects the outcomes into a report
    #[instrument(skip(self, inputs), fields(family = %self.inspector.family(), count = inputs.len()))]
    pub async fn run(&self, inputs: Vec<PathBuf>) -> Result<ScanReport> {
        let workspace = Arc::new(tempfile::Builder::new().prefix("docguard-").tempdir()?);
        debug!("Working directory {}", workspace.path().display());

        let mut handles = Vec::with_capacity(inputs.len());
        for input in inputs {
            let inspector = Arc::clone(&self.inspector);
            let limiter = Arc::clone(&self.limiter);
            let workspace = Arc::clone(&workspace);
            let output_dir = self.output_dir.clone();
            let task_input = input.clone();
            let handle = tokio::spawn(async move {
                let Ok(_permit) = limiter.acquire_owned().await else {
                    return rejected(input, RejectionKind::FileAccess);
                };
                let fallback = input.clone();
                let result = tokio::task::spawn_blocking(move || {
                    process_file(&inspector, &input, &workspace, output_dir.as_deref())
                })
                .await;
                joined(fallback, result)
            });
            handles.push((task_input, handle));
        }

        let mut report = ScanReport::new();
        for (input, handle) in handles {
            let outcome = joined(input, handle.await);
            report.record(&outcome.input, self.inspector.family(), outcome.verdict, outcome.sha256);
        }
        report.finish();
        info!(
            "{} file(s): {} accepted, {} rejected",
            report.summary.total, report.summary.accepted, report.summary.rejected
        );
        Ok(report)
    }
}

fn rejected(input: PathBuf, kind: RejectionKind) -> FileOutcome {
    FileOutcome {
        input,
        verdict: Verdict::rejected(kind),
        sha256: None,
    }
}

/// A task that panicked or was cancelled still yields a rejection for its input
fn joined(input: PathBuf, result: std::result::Result<FileOutcome, JoinError>) -> FileOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Inspection of {} aborted: {}", input.display(), e);
            rejected(input, RejectionKind::ParseFailed)
        }
    }
}

/// Materialize, inspect, then keep or discard one input
fn process_file(inspector: &Inspector, input: &Path, workspace: &TempDir, output_dir: Option<&Path>) -> FileOutcome {
    let working = match NamedTempFile::new_in(workspace.path()) {
        Ok(file) => file,
        Err(e) => {
            error!("Cannot create working file: {}", e);
            return rejected(input.to_path_buf(), RejectionKind::FileAccess);
        }
    };
    if let Err(e) = fs::copy(input, working.path()) {
        debug!("Cannot copy {}: {}", input.display(), e);
        discard(working);
        return rejected(input.to_path_buf(), RejectionKind::FileAccess);
    }

    let verdict = inspector.evaluate(working.path());
    if !verdict.safe {
        discard(working);
        return FileOutcome {
            input: input.to_path_buf(),
            verdict,
            sha256: None,
        };
    }

    let sha256 = match sha256_file(working.path()) {
        Ok(digest) => digest,
        Err(e) => {
            error!("Cannot hash {}: {}", input.display(), e);
            discard(working);
            return rejected(input.to_path_buf(), RejectionKind::FileAccess);
        }
    };

    if let Some(dir) = output_dir {
        let Some(name) = input.file_name() else {
            discard(working);
            return rejected(input.to_path_buf(), RejectionKind::FileAccess);
        };
        let destination = dir.join(name);
        if let Err(e) = fs::copy(working.path(), &destination) {
            error!("Cannot store {}: {}", destination.display(), e);
            discard(working);
            return rejected(input.to_path_buf(), RejectionKind::FileAccess);
        }
        debug!("Stored {}", destination.display());
    }

    FileOutcome {
        input: input.to_path_buf(),
        verdict,
        sha256: Some(sha256),
    }
}

/// Removes a working file, overwriting it when it cannot be removed
fn discard(working: NamedTempFile) {
    match working.keep() {
        Ok((file, path)) => {
            drop(file);
            safely_remove(&path);
        }
        Err(e) => safely_remove(e.file.path()),
    }
}
