//! Console report sink

use crate::domain::AuditReport;
use crate::error::DeliveryError;
use crate::output::OutputFormatter;
use crate::sink::ReportSink;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// Writes the report to stdout (or any writer)
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    /// Renders the report for this sink instead of using the shared text
    formatter: Option<Box<dyn OutputFormatter>>,
}

impl ConsoleSink {
    /// Create a sink writing to the given writer
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            formatter: None,
        }
    }

    /// Create a sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Render with a dedicated formatter, e.g. a colored one for a terminal
    pub fn with_formatter(mut self, formatter: Box<dyn OutputFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }
}

#[async_trait]
impl ReportSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, report: &AuditReport, formatted: &str) -> Result<(), DeliveryError> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let written = match &self.formatter {
            Some(formatter) => formatter.format(report, &mut **writer),
            None => writer.write_all(formatted.as_bytes()),
        };
        written
            .and_then(|()| writer.flush())
            .map_err(DeliveryError::Console)
    }
}
