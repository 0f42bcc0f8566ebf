//! Package metadata as reported by a registry

use super::VersionRange;
use std::fmt;

/// A dependency declared by a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Registry-local package name (e.g., `acme.foo`)
    pub name: String,
    /// Declared version range
    pub range: VersionRange,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.range)
    }
}

/// Metadata of a single package: its declared dependencies and status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Registry-local package name
    pub name: String,
    /// Declared dependencies, in declaration order
    pub dependencies: Vec<Dependency>,
    /// Whether the registry marks this package as deprecated
    pub deprecated: bool,
}

impl PackageMetadata {
    /// Creates metadata without dependencies
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            deprecated: false,
        }
    }

    /// Adds a dependency (builder pattern)
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Sets the deprecation flag (builder pattern)
    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }
}

/// Converts a managed-list identifier (`owner/name`) into the registry-local form (`owner.name`)
pub fn registry_name(identifier: &str) -> String {
    identifier.trim().replace('/', ".")
}
