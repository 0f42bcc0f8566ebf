//! depaudit - Dependency compatibility audit CLI tool
//!
//! Checks a list of managed packages against a hypothetical release of one
//! package and reports every dependency range the release would break.

use clap::Parser;
use colored::Colorize;
use depaudit::cli::CliArgs;
use depaudit::loader::YamlPackageList;
use depaudit::output::{create_formatter, OutputFormat};
use depaudit::registry::{GalaxyAdapter, HttpClient};
use depaudit::runner::AuditRunner;
use depaudit::sink::{build_sinks, ConsoleSink, ReportSink};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code when the report shows mismatches or unevaluated packages
const EXIT_INCOMPATIBLE: u8 = 2;
/// Exit code when a report destination failed
const EXIT_DELIVERY_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Logs go to stderr so stdout carries only the report
    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let client = HttpClient::with_timeout(args.timeout)?;
    let registry = Arc::new(GalaxyAdapter::with_base_url(
        client.clone(),
        &args.registry_url,
    ));
    let loader = YamlPackageList::new(args.packages.as_deref(), client.clone());

    let output_config = args.output_config();
    let formatter = create_formatter(output_config.clone());

    let mut console = ConsoleSink::stdout();
    if output_config.format == OutputFormat::Text && std::io::stdout().is_terminal() {
        console = console.with_formatter(create_formatter(output_config.with_color(true)));
    }
    let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(console)];
    sinks.extend(build_sinks(&args.sink_config(), &client));

    let runner = AuditRunner::new(registry, args.audit_config());
    let outcome = match runner
        .run_and_report(
            &args.target,
            &args.target_version,
            &loader,
            formatter.as_ref(),
            &sinks,
        )
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {}", "Validation failed:".red().bold(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    for error in &outcome.delivery_errors {
        eprintln!("{} {}", "Delivery failed:".yellow().bold(), error);
    }

    if !outcome.delivery_errors.is_empty() {
        Ok(ExitCode::from(EXIT_DELIVERY_FAILED))
    } else if outcome.report.is_compatible() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INCOMPATIBLE))
    }
}
