//! Report formatter implementation

use std::fmt::Write;
use std::fs;
use std::path::Path;

use super::{ReportError, ReportFormat, ScanReport};

/// Formats report data into the supported output formats
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &ScanReport, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Self::to_text(report),
            ReportFormat::Json => Self::to_json(report),
        }
    }

    /// Renders the report and writes it to `path`
    pub fn write(report: &ScanReport, format: ReportFormat, path: &Path) -> Result<(), ReportError> {
        let rendered = Self::format(report, format)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    fn to_text(report: &ScanReport) -> Result<String, ReportError> {
        let mut output = String::new();
        output.push_str("Document Scan Report\n");
        output.push_str("====================\n\n");

        for entry in &report.entries {
            let outcome = match entry.rejection {
                Some(kind) if !entry.accepted => format!("rejected ({})", kind),
                _ if entry.accepted => "accepted".to_string(),
                _ => "rejected".to_string(),
            };
            writeln!(output, "{} [{}] {}", entry.path.display(), entry.family, outcome)
                .map_err(|e| ReportError::SerializationError(e.to_string()))?;
            if let Some(digest) = &entry.sha256 {
                writeln!(output, "    sha256 {}", digest)
                    .map_err(|e| ReportError::SerializationError(e.to_string()))?;
            }
        }

        writeln!(
            output,
            "\n{} file(s): {} accepted, {} rejected",
            report.summary.total, report.summary.accepted, report.summary.rejected
        )
        .map_err(|e| ReportError::SerializationError(e.to_string()))?;
        Ok(output)
    }

    fn to_json(report: &ScanReport) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report).map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}
