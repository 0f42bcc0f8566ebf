//! Dependency evaluation against an override target
//!
//! This module provides:
//! - The override target (name and hypothetical version)
//! - The evaluator that resolves each declared dependency to a version and
//!   checks it against the declared range

use crate::domain::{EvaluationResult, PackageMetadata, Version};
use crate::registry::RegistryClient;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// The package whose hypothetical version is checked against everyone's ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideTarget {
    /// Registry-local name
    pub name: String,
    /// Hypothetical version
    pub version: Version,
    /// Whether the registry marks the target deprecated
    pub deprecated: bool,
}

impl OverrideTarget {
    /// Create a new override target
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            deprecated: false,
        }
    }

    /// Sets the deprecation flag (builder pattern)
    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }
}

/// Evaluates a package's declared dependencies
#[derive(Clone)]
pub struct DependencyEvaluator {
    registry: Arc<dyn RegistryClient>,
    target: OverrideTarget,
}

impl DependencyEvaluator {
    /// Create a new evaluator
    pub fn new(registry: Arc<dyn RegistryClient>, target: OverrideTarget) -> Self {
        Self { registry, target }
    }

    /// Evaluate every declared dependency, in declaration order.
    ///
    /// The result has exactly one entry per declared dependency. Lookup
    /// failures are recorded as unresolved, unsatisfied results.
    pub async fn evaluate(&self, metadata: &PackageMetadata) -> Vec<EvaluationResult> {
        let mut results = Vec::with_capacity(metadata.dependencies.len());
        let mut flagged: HashSet<&str> = HashSet::new();

        for dependency in &metadata.dependencies {
            let range = dependency.range.to_string();

            let (mut result, deprecated) = if dependency.name == self.target.name {
                let satisfied = dependency.range.satisfies(&self.target.version);
                let result = EvaluationResult::resolved(
                    &dependency.name,
                    range,
                    self.target.version.clone(),
                    satisfied,
                    true,
                );
                (result, self.target.deprecated)
            } else {
                match self.registry.latest_release(&dependency.name).await {
                    Ok(release) => {
                        let satisfied = dependency.range.satisfies(&release.version);
                        let result = EvaluationResult::resolved(
                            &dependency.name,
                            range,
                            release.version,
                            satisfied,
                            false,
                        );
                        (result, release.deprecated)
                    }
                    Err(e) => {
                        warn!(
                            package = %metadata.name,
                            dependency = %dependency.name,
                            error = %e,
                            "could not resolve dependency version"
                        );
                        let result =
                            EvaluationResult::unresolved(&dependency.name, range, e.to_string());
                        (result, false)
                    }
                }
            };

            // A repeated dependency is only flagged at its first occurrence
            if deprecated && flagged.insert(dependency.name.as_str()) {
                result.dependency_deprecated = true;
            }

            debug!(
                package = %metadata.name,
                dependency = %result.dependency_name,
                resolved = %result.resolved_display(),
                satisfied = result.satisfied,
                "evaluated dependency"
            );
            results.push(result);
        }

        results
    }
}
