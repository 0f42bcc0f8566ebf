//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Malformed versions and version ranges
//! - RegistryError: Issues with package registry communication
//! - LoadError: Issues resolving the managed package list
//! - ValidationError: Failures that abort a run before evaluation
//! - DeliveryError: A report sink failed to deliver

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Version parsing errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Package list loading errors
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Run validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Report delivery errors
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Errors related to version and range parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Input is not a semantic version
    #[error("malformed version '{input}': {message}")]
    MalformedVersion { input: String, message: String },

    /// Input is not a valid version range
    #[error("malformed version range '{input}': {message}")]
    MalformedRange { input: String, message: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to resolving the managed package list
#[derive(Error, Debug)]
pub enum LoadError {
    /// Failed to read the package list file
    #[error("failed to read package list {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to download the package list
    #[error("failed to fetch package list from {url}: {message}")]
    FetchError { url: String, message: String },

    /// Content is not a YAML sequence of strings
    #[error("package list {source_name} is not a YAML list of package names: {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    /// An entry in the list is empty
    #[error("package list {source_name} contains an empty entry at position {index}")]
    EmptyEntry { source_name: String, index: usize },
}

/// Errors that abort a run before any package is examined
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The override target does not exist on the registry
    #[error("target package '{name}' does not exist on the {registry} registry")]
    TargetNotFound { name: String, registry: String },

    /// The override version is not a semantic version
    #[error("invalid target version: {0}")]
    InvalidTargetVersion(#[from] VersionError),

    /// The registry could not confirm the target exists
    #[error("could not verify target package: {0}")]
    RegistryUnavailable(#[source] RegistryError),

    /// The managed package list could not be resolved
    #[error("could not load package list: {0}")]
    PackageList(#[from] LoadError),
}

/// Errors raised by report sinks
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// A required credential was not configured
    #[error("{sink} sink requires a credential: {message}")]
    MissingCredential { sink: String, message: String },

    /// Failed to write the report file
    #[error("failed to write report to {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to the console
    #[error("failed to write report to console: {0}")]
    Console(#[source] std::io::Error),

    /// Webhook request failed or returned a non-success status
    #[error("webhook delivery to {url} failed: {message}")]
    Webhook { url: String, message: String },
}

impl VersionError {
    /// Creates a new MalformedVersion error
    pub fn malformed_version(input: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::MalformedVersion {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates a new MalformedRange error
    pub fn malformed_range(input: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::MalformedRange {
            input: input.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Returns true if the registry has no such package
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::PackageNotFound { .. })
    }

    /// Returns true for network or registry failures that may succeed on a later run
    pub fn is_transient(&self) -> bool {
        !self.is_not_found()
    }
}

impl LoadError {
    /// Creates a new ParseError
    pub fn parse_error(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        LoadError::ParseError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl DeliveryError {
    /// Creates a new Webhook error
    pub fn webhook(url: impl Into<String>, message: impl Into<String>) -> Self {
        DeliveryError::Webhook {
            url: url.into(),
            message: message.into(),
        }
    }
}
