//! Webhook report sink
//!
//! Posts the report as JSON:
//!
//! ```json
//! {"text": "<formatted report>", "target": "acme.foo", "version": "5.0.1", "compatible": false}
//! ```

use crate::domain::AuditReport;
use crate::error::DeliveryError;
use crate::registry::HttpClient;
use crate::sink::ReportSink;
use async_trait::async_trait;
use serde::Serialize;

/// Webhook destination and credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Endpoint receiving the POST
    pub url: String,
    /// Bearer token sent with each request
    pub token: Option<String>,
}

impl WebhookConfig {
    /// Create a webhook configuration
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            url: url.into(),
            token,
        }
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    text: &'a str,
    target: &'a str,
    version: String,
    compatible: bool,
}

/// Posts the report to a webhook
pub struct WebhookSink {
    config: WebhookConfig,
    client: HttpClient,
}

impl WebhookSink {
    /// Create a new webhook sink
    pub fn new(config: WebhookConfig, client: HttpClient) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl ReportSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, report: &AuditReport, formatted: &str) -> Result<(), DeliveryError> {
        let token = self
            .config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DeliveryError::MissingCredential {
                sink: self.name().to_string(),
                message: "no webhook token configured".to_string(),
            })?;

        let payload = Payload {
            text: formatted,
            target: &report.target_name,
            version: report.target_version.to_string(),
            compatible: report.is_compatible(),
        };

        let response = self
            .client
            .inner()
            .post(&self.config.url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::webhook(&self.config.url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::webhook(
                &self.config.url,
                format!("HTTP {}", status),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockito::{Matcher, Server};
    use semver::Version;

    fn report() -> AuditReport {
        AuditReport {
            target_name: "acme.foo".to_string(),
            target_version: Version::new(5, 0, 1),
            target_deprecated: false,
            used_default_package_list: true,
            package_list_source: "packages.yml".to_string(),
            generated_at: Utc::now(),
            package_reports: Vec::new(),
        }
    }

    fn sink(url: String, token: Option<&str>) -> WebhookSink {
        WebhookSink::new(
            WebhookConfig::new(url, token.map(String::from)),
            HttpClient::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_posts_report() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "text": "report body",
                "target": "acme.foo",
                "version": "5.0.1",
                "compatible": true
            })))
            .with_status(200)
            .create_async()
            .await;

        let sink = sink(format!("{}/hook", server.url()), Some("secret"));
        sink.deliver(&report(), "report body").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let sink = sink(format!("{}/hook", server.url()), Some("secret"));
        let result = sink.deliver(&report(), "text").await;

        match result {
            Err(DeliveryError::Webhook { message, .. }) => assert!(message.contains("500")),
            other => panic!("Expected Webhook error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .expect(0)
            .create_async()
            .await;

        let sink = sink(format!("{}/hook", server.url()), None);
        let result = sink.deliver(&report(), "text").await;

        assert!(matches!(
            result,
            Err(DeliveryError::MissingCredential { .. })
        ));
        mock.assert_async().await;
    }
}
