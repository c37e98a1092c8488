//! Report sinks.
//!
//! A reporter serializes one [`DriftReport`] to its output. The pipeline
//! treats reporters as value-like configured components; writes for distinct
//! resources may happen concurrently, so file-backed variants should be
//! given distinct paths per resource or wrapped by the caller.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::report::DriftReport;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create output directory {path}")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write drift report to {target}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize drift report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to encode drift report as CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[async_trait]
pub trait Reporter: Send + Sync {
    async fn write_report(&self, report: &DriftReport) -> Result<(), ReportError>;
}

/// Pretty-printed JSON on the standard output stream, one report per write.
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl StdoutReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Reporter for StdoutReporter {
    async fn write_report(&self, report: &DriftReport) -> Result<(), ReportError> {
        let encoded = serde_json::to_string_pretty(report)?;
        println!("{encoded}");
        Ok(())
    }
}

/// Pretty-printed JSON written to a file; subsequent writes overwrite.
#[derive(Debug)]
pub struct FileReporter {
    output_file: PathBuf,
}

impl FileReporter {
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self { output_file: output_file.into() }
    }
}

fn ensure_output_dir(output_file: &Path) -> Result<(), ReportError> {
    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| ReportError::DirCreate {
                path: parent.to_path_buf(),
                source: err,
            })?;
        }
    }
    Ok(())
}

#[async_trait]
impl Reporter for FileReporter {
    async fn write_report(&self, report: &DriftReport) -> Result<(), ReportError> {
        ensure_output_dir(&self.output_file)?;

        let encoded = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&self.output_file, encoded).await.map_err(|err| {
            ReportError::Write {
                target: self.output_file.display().to_string(),
                source: err,
            }
        })?;

        tracing::info!(path = %self.output_file.display(), "drift report written");
        Ok(())
    }
}

/// One CSV row per drift item, or a single summary row when a report has no
/// items.
#[derive(Debug)]
pub struct CsvReporter {
    output_file: PathBuf,
}

impl CsvReporter {
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self { output_file: output_file.into() }
    }

    const HEADER: [&'static str; 10] = [
        "GeneratedAt",
        "ResourceId",
        "ResourceType",
        "ResourceName",
        "HasDrift",
        "ReportStatus",
        "DriftField",
        "TerraformValue",
        "ActualValue",
        "DriftType",
    ];
}

#[async_trait]
impl Reporter for CsvReporter {
    async fn write_report(&self, report: &DriftReport) -> Result<(), ReportError> {
        ensure_output_dir(&self.output_file)?;

        let mut writer = csv::Writer::from_path(&self.output_file)?;
        writer.write_record(Self::HEADER)?;

        let generated_at = report.generated_at.to_rfc3339();
        let has_drift = report.has_drift.to_string();
        let status = report.status.to_string();

        if report.drift_details.is_empty() {
            writer.write_record([
                generated_at.as_str(),
                report.resource_id.as_str(),
                report.resource_type.as_str(),
                report.resource_name.as_str(),
                has_drift.as_str(),
                status.as_str(),
                "",
                "",
                "",
                "",
            ])?;
        } else {
            for item in &report.drift_details {
                writer.write_record([
                    generated_at.as_str(),
                    report.resource_id.as_str(),
                    report.resource_type.as_str(),
                    report.resource_name.as_str(),
                    has_drift.as_str(),
                    status.as_str(),
                    item.field.as_str(),
                    item.terraform_value.as_str(),
                    item.actual_value.as_str(),
                    item.drift_type.as_str(),
                ])?;
            }
        }

        writer.flush().map_err(|err| ReportError::Write {
            target: self.output_file.display().to_string(),
            source: err,
        })?;

        tracing::info!(path = %self.output_file.display(), "drift report written (CSV format)");
        Ok(())
    }
}

/// Selects the reporter for an output path: empty means stdout, a `.csv`
/// extension means tabular output, anything else a JSON file.
pub fn reporter_for(output_file: &str) -> Box<dyn Reporter> {
    if output_file.is_empty() {
        Box::new(StdoutReporter::new())
    } else if Path::new(output_file).extension().is_some_and(|ext| ext == "csv") {
        Box::new(CsvReporter::new(output_file))
    } else {
        Box::new(FileReporter::new(output_file))
    }
}
