//! CLI argument parsing module for depaudit

use crate::output::OutputConfig;
use crate::registry::DEFAULT_GALAXY_URL;
use crate::runner::{default_concurrency, AuditConfig};
use crate::sink::{SinkConfig, WebhookConfig};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Parse timeout string in format: N (seconds), Ns (seconds), Nm (minutes)
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty timeout string".to_string());
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else {
        (s, 1)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in timeout: {}", num_str))?;
    if num == 0 {
        return Err("timeout must be greater than zero".to_string());
    }

    let seconds = num
        .checked_mul(multiplier)
        .ok_or_else(|| format!("timeout too large: {}", s))?;
    Ok(Duration::from_secs(seconds))
}

/// Check managed packages against a hypothetical release of one package
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depaudit",
    version,
    about = "Check managed packages against a hypothetical release of a dependency",
    after_help = "EXIT CODES:
    0  All packages compatible
    1  Validation failed or an error occurred
    2  Mismatches found or packages could not be evaluated
    3  Report produced but a destination failed"
)]
pub struct CliArgs {
    /// Package whose release is being checked (ns/name or ns.name)
    pub target: String,

    /// Hypothetical version of the target
    #[arg(value_name = "VERSION", id = "target_version")]
    pub target_version: String,

    /// Managed package list: YAML file path or http(s) URL (default: packages.yml)
    #[arg(short, long, value_name = "PATH|URL")]
    pub packages: Option<String>,

    // Output options
    /// Include satisfied dependencies in the report
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print only the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Output the report in JSON format
    #[arg(long)]
    pub json: bool,

    // Report destinations
    /// Append the report to this log file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Post the report to this webhook URL
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Bearer token for the webhook
    #[arg(long, env = "DEPAUDIT_WEBHOOK_TOKEN", hide_env_values = true)]
    pub webhook_token: Option<String>,

    // Registry options
    /// Base URL of the Galaxy registry
    #[arg(long, value_name = "URL", default_value = DEFAULT_GALAXY_URL)]
    pub registry_url: String,

    /// Per-request timeout (e.g., 30, 45s, 2m)
    #[arg(long, value_parser = parse_timeout, default_value = "30")]
    pub timeout: Duration,

    /// Maximum number of packages evaluated at once (default: available parallelism)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,
}

impl CliArgs {
    /// Runner configuration for these arguments
    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            concurrency: self
                .concurrency
                .map(usize::from)
                .unwrap_or_else(default_concurrency),
            show_progress: !self.quiet && !self.json,
        }
    }

    /// Output configuration for these arguments
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::from_cli(self.json, self.verbose, self.quiet)
    }

    /// Report destinations besides the console
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            log_file: self.log_file.clone(),
            webhook: self
                .webhook_url
                .as_ref()
                .map(|url| WebhookConfig::new(url, self.webhook_token.clone())),
        }
    }
}
