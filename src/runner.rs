//! Audit runner for coordinating the entire audit workflow
//!
//! This module provides:
//! - Workflow coordination: validate → load → evaluate → aggregate → report
//! - Bounded parallel package evaluation
//! - Per-package failure isolation
//! - Input-order aggregation independent of completion order

use crate::domain::{parse_version, registry_name, AuditReport, PackageReport};
use crate::error::{DeliveryError, ValidationError};
use crate::evaluate::{DependencyEvaluator, OverrideTarget};
use crate::loader::{PackageList, PackageListLoader};
use crate::output::OutputFormatter;
use crate::progress::AuditProgress;
use crate::registry::RegistryClient;
use crate::sink::{deliver_all, ReportSink};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Fallback concurrency limit when available parallelism is unknown
const DEFAULT_CONCURRENCY: usize = 10;

/// Returns the number of packages evaluated at once by default
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(DEFAULT_CONCURRENCY)
}

/// Configuration for the audit runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Maximum number of packages evaluated concurrently
    pub concurrency: usize,
    /// Whether to show a progress bar
    pub show_progress: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            show_progress: false,
        }
    }
}

/// Phases of an audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Loading,
    Evaluating,
    Aggregating,
    Reporting,
    Done,
    FailedValidation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Validating => "validating",
            Phase::Loading => "loading",
            Phase::Evaluating => "evaluating",
            Phase::Aggregating => "aggregating",
            Phase::Reporting => "reporting",
            Phase::Done => "done",
            Phase::FailedValidation => "failed validation",
        };
        write!(f, "{}", name)
    }
}

/// Result of a completed run: the report and any sink failures
#[derive(Debug)]
pub struct AuditOutcome {
    /// The assembled report
    pub report: AuditReport,
    /// Sinks that failed to deliver
    pub delivery_errors: Vec<DeliveryError>,
}

/// Runner for the audit workflow
pub struct AuditRunner {
    /// Registry used for every lookup
    registry: Arc<dyn RegistryClient>,
    /// Runner configuration
    config: AuditConfig,
}

impl AuditRunner {
    /// Create a new runner
    pub fn new(registry: Arc<dyn RegistryClient>, config: AuditConfig) -> Self {
        Self { registry, config }
    }

    /// Run the audit and deliver the formatted report to every sink
    pub async fn run_and_report(
        &self,
        target_name: &str,
        target_version: &str,
        loader: &dyn PackageListLoader,
        formatter: &dyn OutputFormatter,
        sinks: &[Box<dyn ReportSink>],
    ) -> Result<AuditOutcome, ValidationError> {
        let report = self.run(target_name, target_version, loader).await?;

        debug!(phase = %Phase::Reporting, sinks = sinks.len());
        let formatted = formatter.render(&report);
        let delivery_errors = deliver_all(sinks, &report, &formatted).await;

        debug!(phase = %Phase::Done);
        Ok(AuditOutcome {
            report,
            delivery_errors,
        })
    }

    /// Run the audit and return the aggregated report.
    ///
    /// Fails only when the override target or the package list is invalid;
    /// failures of individual packages become part of the report.
    pub async fn run(
        &self,
        target_name: &str,
        target_version: &str,
        loader: &dyn PackageListLoader,
    ) -> Result<AuditReport, ValidationError> {
        let mut progress = AuditProgress::new(self.config.show_progress);
        progress.validating(target_name);

        debug!(phase = %Phase::Validating, package = target_name, version = target_version);
        let target = match self.validate(target_name, target_version).await {
            Ok(target) => target,
            Err(e) => {
                progress.finish();
                warn!(phase = %Phase::FailedValidation, error = %e);
                return Err(e);
            }
        };

        debug!(phase = %Phase::Loading);
        progress.loading();
        let loaded = loader.load().await;
        progress.finish();
        let list = loaded.map_err(|e| {
            warn!(phase = %Phase::FailedValidation, error = %e);
            ValidationError::from(e)
        })?;

        debug!(phase = %Phase::Evaluating, packages = list.names.len());
        let evaluator = DependencyEvaluator::new(Arc::clone(&self.registry), target.clone());
        let package_reports = self.evaluate_all(&list, evaluator, &mut progress).await;
        let tally = progress.tally();

        debug!(phase = %Phase::Aggregating);
        let report = AuditReport {
            target_name: target.name,
            target_version: target.version,
            target_deprecated: target.deprecated,
            used_default_package_list: list.is_default,
            package_list_source: list.source,
            generated_at: Utc::now(),
            package_reports,
        };
        info!(
            packages = report.package_reports.len(),
            compatible = tally.compatible,
            mismatched = tally.mismatched,
            not_found = tally.not_found,
            "audit complete"
        );
        Ok(report)
    }

    /// Confirm the override version parses and the target exists
    async fn validate(&self, name: &str, version: &str) -> Result<OverrideTarget, ValidationError> {
        let version = parse_version(version)?;
        let name = registry_name(name);

        match self.registry.exists(&name).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ValidationError::TargetNotFound {
                    name,
                    registry: self.registry.registry_name().to_string(),
                })
            }
            Err(e) => return Err(ValidationError::RegistryUnavailable(e)),
        }

        let deprecated = match self.registry.is_deprecated(&name).await {
            Ok(deprecated) => deprecated,
            Err(e) => {
                warn!(package = %name, error = %e, "could not check target deprecation");
                false
            }
        };

        Ok(OverrideTarget::new(name, version).with_deprecated(deprecated))
    }

    /// Evaluate every package on a bounded pool and reassemble in input order
    async fn evaluate_all(
        &self,
        list: &PackageList,
        evaluator: DependencyEvaluator,
        progress: &mut AuditProgress,
    ) -> Vec<PackageReport> {
        progress.evaluating(list.names.len());

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, package) in list.names.iter().cloned().enumerate() {
            let registry = Arc::clone(&self.registry);
            let evaluator = evaluator.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire().await.ok();
                let report = evaluate_package(registry.as_ref(), &evaluator, &package).await;
                (index, report)
            });
        }

        let mut slots: Vec<Option<PackageReport>> = vec![None; list.names.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => {
                    progress.record(&report);
                    slots[index] = Some(report);
                }
                Err(e) => {
                    warn!(error = %e, "package evaluation task failed");
                    progress.record_lost();
                }
            }
        }
        progress.finish();

        slots
            .into_iter()
            .zip(&list.names)
            .map(|(slot, package)| {
                slot.unwrap_or_else(|| PackageReport::failed(package, "evaluation task failed"))
            })
            .collect()
    }
}

/// Evaluate one managed package, converting registry failures into report content
async fn evaluate_package(
    registry: &dyn RegistryClient,
    evaluator: &DependencyEvaluator,
    package: &str,
) -> PackageReport {
    let name = registry_name(package);

    // A missing package surfaces as not-found from the metadata lookup itself
    let metadata = match registry.fetch_metadata(&name).await {
        Ok(metadata) => metadata,
        Err(e) if e.is_not_found() => {
            warn!(package, "package not found on registry");
            return PackageReport::not_found(package);
        }
        Err(e) => {
            warn!(package, error = %e, "metadata fetch failed");
            return PackageReport::failed(package, e.to_string());
        }
    };

    let results = evaluator.evaluate(&metadata).await;
    PackageReport::evaluated(package, metadata.deprecated, results)
}
