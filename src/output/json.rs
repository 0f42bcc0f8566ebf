//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of audit reports
//! - Structured package-by-package dependency results

use crate::domain::{AuditReport, EvaluationResult, PackageReport};
use crate::output::{OutputFormatter, Verbosity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Override target name
    target: &'a str,
    /// Hypothetical target version
    version: String,
    /// Whether the target is deprecated
    target_deprecated: bool,
    /// Where the package list came from
    package_list: &'a str,
    /// Whether the default package list was used
    default_package_list: bool,
    /// When the report was assembled
    generated_at: DateTime<Utc>,
    /// Whether every package is compatible
    compatible: bool,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-package results
    packages: Vec<JsonPackage<'a>>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    /// Packages in the list
    checked: usize,
    /// Packages whose dependencies were evaluated
    evaluated: usize,
    /// Evaluated packages with at least one mismatch
    mismatched: usize,
    /// Packages that could not be evaluated
    not_found: usize,
    /// Evaluated packages that are themselves deprecated
    deprecated: usize,
}

/// JSON representation of a package report
#[derive(Serialize)]
struct JsonPackage<'a> {
    /// Package identifier
    name: &'a str,
    /// Whether the package was evaluated
    found: bool,
    /// Whether the package is deprecated
    deprecated: bool,
    /// Whether every dependency is satisfied
    all_satisfied: bool,
    /// Why the package could not be evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    /// Dependency results (satisfied ones only in verbose mode)
    dependencies: Vec<&'a EvaluationResult>,
}

impl JsonFormatter {
    /// Convert a package report to JSON representation
    fn package_to_json<'a>(&self, package: &'a PackageReport) -> JsonPackage<'a> {
        let dependencies = package
            .results
            .iter()
            .filter(|r| self.verbosity == Verbosity::Verbose || !r.satisfied)
            .collect();

        JsonPackage {
            name: &package.package_name,
            found: package.found,
            deprecated: package.deprecated,
            all_satisfied: package.all_satisfied,
            error: package.error.as_deref(),
            dependencies,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &AuditReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            target: &report.target_name,
            version: report.target_version.to_string(),
            target_deprecated: report.target_deprecated,
            package_list: &report.package_list_source,
            default_package_list: report.used_default_package_list,
            generated_at: report.generated_at,
            compatible: report.is_compatible(),
            summary: JsonSummary {
                checked: report.package_reports.len(),
                evaluated: report.found_count(),
                mismatched: report.mismatched_count(),
                not_found: report.not_found_count(),
                deprecated: report.deprecated_packages().count(),
            },
            packages: report
                .package_reports
                .iter()
                .map(|p| self.package_to_json(p))
                .collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
