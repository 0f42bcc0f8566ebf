//! Log file report sink

use crate::domain::AuditReport;
use crate::error::DeliveryError;
use crate::sink::ReportSink;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Appends each report to a log file, after a timestamped separator
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink appending to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn deliver(&self, report: &AuditReport, formatted: &str) -> Result<(), DeliveryError> {
        let write_error = |source| DeliveryError::WriteError {
            path: self.path.clone(),
            source,
        };

        let mut entry = format!(
            "===== {} | {} {} =====\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            report.target_name,
            report.target_version
        );
        entry.push_str(formatted);
        if !formatted.ends_with('\n') {
            entry.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_error)?;
        file.write_all(entry.as_bytes()).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)
    }
}
