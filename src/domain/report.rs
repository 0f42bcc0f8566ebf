//! Audit result types
//!
//! Provides structures for tracking satisfaction results at the dependency,
//! package, and run levels.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::Serialize;

/// Result of checking one declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    /// Name of the dependency
    pub dependency_name: String,
    /// Declared range in display form
    pub range: String,
    /// Version the range was checked against; `None` when it could not be resolved
    pub resolved_version: Option<Version>,
    /// Whether the resolved version satisfies the range
    pub satisfied: bool,
    /// Whether the resolved version came from the override rather than the registry
    pub resolved_via_override: bool,
    /// Whether the dependency itself is deprecated
    pub dependency_deprecated: bool,
    /// Why the version could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationResult {
    /// Creates a result for a resolved dependency
    pub fn resolved(
        dependency_name: impl Into<String>,
        range: impl Into<String>,
        resolved_version: Version,
        satisfied: bool,
        resolved_via_override: bool,
    ) -> Self {
        Self {
            dependency_name: dependency_name.into(),
            range: range.into(),
            resolved_version: Some(resolved_version),
            satisfied,
            resolved_via_override,
            dependency_deprecated: false,
            error: None,
        }
    }

    /// Creates a result for a dependency whose version lookup failed
    pub fn unresolved(
        dependency_name: impl Into<String>,
        range: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            dependency_name: dependency_name.into(),
            range: range.into(),
            resolved_version: None,
            satisfied: false,
            resolved_via_override: false,
            dependency_deprecated: false,
            error: Some(error.into()),
        }
    }

    /// Returns the resolved version for display, or `unresolved`
    pub fn resolved_display(&self) -> String {
        self.resolved_version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unresolved".to_string())
    }
}

/// Result of auditing one managed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    /// Package identifier as written in the managed list
    pub package_name: String,
    /// Whether the package's metadata could be fetched
    pub found: bool,
    /// Whether the package itself is deprecated
    pub deprecated: bool,
    /// One result per declared dependency, in declaration order
    pub results: Vec<EvaluationResult>,
    /// Whether every dependency is satisfied
    pub all_satisfied: bool,
    /// Why the package could not be evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PackageReport {
    /// Creates a report for an evaluated package
    pub fn evaluated(
        package_name: impl Into<String>,
        deprecated: bool,
        results: Vec<EvaluationResult>,
    ) -> Self {
        let all_satisfied = results.iter().all(|r| r.satisfied);
        Self {
            package_name: package_name.into(),
            found: true,
            deprecated,
            results,
            all_satisfied,
            error: None,
        }
    }

    /// Creates a report for a package that is missing from the registry
    pub fn not_found(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            found: false,
            deprecated: false,
            results: Vec::new(),
            all_satisfied: false,
            error: None,
        }
    }

    /// Creates a report for a package whose lookup failed
    pub fn failed(package_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::not_found(package_name)
        }
    }

    /// Returns the results that do not satisfy their range
    pub fn mismatches(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(|r| !r.satisfied)
    }

    /// Returns the number of unsatisfied dependencies
    pub fn mismatch_count(&self) -> usize {
        self.mismatches().count()
    }
}

/// Root aggregate of one audit run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Registry-local name of the override target
    pub target_name: String,
    /// Hypothetical version of the override target
    pub target_version: Version,
    /// Whether the override target is deprecated
    pub target_deprecated: bool,
    /// Whether the default managed package list was used
    pub used_default_package_list: bool,
    /// Where the managed package list came from
    pub package_list_source: String,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
    /// One report per managed package, in input order
    pub package_reports: Vec<PackageReport>,
}

impl AuditReport {
    /// Returns the number of packages that were evaluated
    pub fn found_count(&self) -> usize {
        self.package_reports.iter().filter(|p| p.found).count()
    }

    /// Returns the number of packages that could not be evaluated
    pub fn not_found_count(&self) -> usize {
        self.package_reports.iter().filter(|p| !p.found).count()
    }

    /// Returns the number of evaluated packages with at least one unsatisfied dependency
    pub fn mismatched_count(&self) -> usize {
        self.package_reports
            .iter()
            .filter(|p| p.found && !p.all_satisfied)
            .count()
    }

    /// Returns the evaluated packages that are deprecated
    pub fn deprecated_packages(&self) -> impl Iterator<Item = &PackageReport> {
        self.package_reports.iter().filter(|p| p.deprecated)
    }

    /// Returns true if every package was found and every dependency satisfied
    pub fn is_compatible(&self) -> bool {
        self.package_reports
            .iter()
            .all(|p| p.found && p.all_satisfied)
    }
}
