//! Report delivery
//!
//! Every configured sink receives the same formatted report. Failures are
//! collected and returned once all sinks have been attempted.

mod console;
mod file;
mod webhook;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use webhook::{WebhookConfig, WebhookSink};

use crate::domain::AuditReport;
use crate::error::DeliveryError;
use crate::registry::HttpClient;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Destination for a finished audit report
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Deliver the report
    async fn deliver(&self, report: &AuditReport, formatted: &str) -> Result<(), DeliveryError>;
}

/// Report destinations requested for a run
#[derive(Debug, Clone, Default)]
pub struct SinkConfig {
    /// Append the report to this file
    pub log_file: Option<PathBuf>,
    /// Post the report to this webhook
    pub webhook: Option<WebhookConfig>,
}

/// Build the file and webhook sinks for a configuration
///
/// The console sink is not included; callers add it with the formatter
/// appropriate for the terminal.
pub fn build_sinks(config: &SinkConfig, client: &HttpClient) -> Vec<Box<dyn ReportSink>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();
    if let Some(path) = &config.log_file {
        sinks.push(Box::new(FileSink::new(path.clone())));
    }
    if let Some(webhook) = &config.webhook {
        sinks.push(Box::new(WebhookSink::new(webhook.clone(), client.clone())));
    }
    sinks
}

/// Deliver to every sink in order, returning the failures
pub async fn deliver_all(
    sinks: &[Box<dyn ReportSink>],
    report: &AuditReport,
    formatted: &str,
) -> Vec<DeliveryError> {
    let mut errors = Vec::new();
    for sink in sinks {
        match sink.deliver(report, formatted).await {
            Ok(()) => debug!(sink = sink.name(), "report delivered"),
            Err(e) => {
                warn!(sink = sink.name(), error = %e, "report delivery failed");
                errors.push(e);
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use semver::Version;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ReportSink for CountingSink {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn deliver(&self, _: &AuditReport, _: &str) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DeliveryError::webhook("http://test", "HTTP 500"));
            }
            Ok(())
        }
    }

    fn report() -> AuditReport {
        AuditReport {
            target_name: "acme.foo".to_string(),
            target_version: Version::new(1, 0, 0),
            target_deprecated: false,
            used_default_package_list: true,
            package_list_source: "packages.yml".to_string(),
            generated_at: Utc::now(),
            package_reports: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_deliver_all_attempts_every_sink() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sinks: Vec<Box<dyn ReportSink>> = vec![
            Box::new(CountingSink {
                calls: calls.clone(),
                fail: true,
            }),
            Box::new(CountingSink {
                calls: calls.clone(),
                fail: false,
            }),
            Box::new(CountingSink {
                calls: calls.clone(),
                fail: true,
            }),
        ];

        let errors = deliver_all(&sinks, &report(), "text").await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_build_sinks() {
        let client = HttpClient::new().unwrap();
        assert!(build_sinks(&SinkConfig::default(), &client).is_empty());

        let config = SinkConfig {
            log_file: Some(PathBuf::from("audit.log")),
            webhook: Some(WebhookConfig::new("http://localhost/hook", None)),
        };
        let names: Vec<_> = build_sinks(&config, &client)
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["file", "webhook"]);
    }
}
