//! Core domain models for depaudit
//!
//! This module contains the fundamental types used throughout the application:
//! - Version ranges and their comparator clauses
//! - Package metadata and declared dependencies
//! - Per-dependency, per-package, and per-run audit results

mod package;
mod report;
mod version_range;

pub use package::{registry_name, Dependency, PackageMetadata};
pub use report::{AuditReport, EvaluationResult, PackageReport};
pub use semver::Version;
pub use version_range::{parse_version, Comparator, Op, VersionRange};
