//! Upload Document Safety Classification
//! Decides whether uploaded office documents and PDFs are safe to keep,
//! and neutralizes hidden payloads in images by re-deriving their pixels.

// Configuration and Core Types
pub mod config;
pub mod error;
pub mod types;

// Stage 0: Container Readers
pub mod office;

// Stage 1: Detectors
pub mod detector;

pub use detector::{
    DocumentDetector, FormatParser, FormatPolicy, OfficeDetector, PdfDetector, PresentationDetector,
    SpreadsheetDetector, WordDetector,
};

// Stage 2: Sanitizers
pub mod sanitizer;

pub use sanitizer::{DocumentSanitizer, ImageSanitizer};

// Stage 3: Dispatch and Batch Processing
pub mod dispatch;
pub mod runner;

pub use dispatch::{DocumentFamily, Inspector, UnknownFamily};
pub use runner::{BatchRunner, FileOutcome};

// Stage 4: Report Generation
pub mod report;

pub use report::{ReportEntry, ReportError, ReportFormat, ReportFormatter, ScanReport};

// Shared Utilities
pub mod utils;

// Re-exports for crate consumers
pub use config::{ConfigError, ScanConfig};
pub use error::{Error, RejectionKind, Result};
pub use types::{FormatTag, Verdict};
