//! Registry adapters for fetching package metadata
//!
//! This module provides:
//! - The `RegistryClient` capability the audit consumes
//! - HTTP client shared foundation
//! - Galaxy collection registry adapter
//! - In-memory registry for tests and offline runs

mod client;
mod galaxy;
mod memory;

pub use client::HttpClient;
pub use galaxy::{GalaxyAdapter, DEFAULT_GALAXY_URL};
pub use memory::InMemoryRegistry;

use crate::domain::{PackageMetadata, Version};
use crate::error::RegistryError;
use async_trait::async_trait;
use tracing::debug;

/// Latest release of a package as one lookup sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: Version,
    pub deprecated: bool,
}

/// Capability for looking up packages on a registry.
///
/// Calls are independent and may be issued concurrently for distinct names.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Get the registry name used in error messages
    fn registry_name(&self) -> &'static str;

    /// Check whether a package exists; a missing package is `Ok(false)`
    async fn exists(&self, name: &str) -> Result<bool, RegistryError>;

    /// Fetch the dependency declarations of the package's current release
    async fn fetch_metadata(&self, name: &str) -> Result<PackageMetadata, RegistryError>;

    /// Check whether the registry marks the package as deprecated
    async fn is_deprecated(&self, name: &str) -> Result<bool, RegistryError>;

    /// Fetch the latest released version of the package
    async fn latest_version(&self, name: &str) -> Result<Version, RegistryError>;

    /// Fetch the latest version together with the deprecation flag.
    ///
    /// A failed deprecation lookup reads as not deprecated. Adapters that
    /// serve both from one response should override this.
    async fn latest_release(&self, name: &str) -> Result<Release, RegistryError> {
        let version = self.latest_version(name).await?;
        let deprecated = match self.is_deprecated(name).await {
            Ok(deprecated) => deprecated,
            Err(e) => {
                debug!(package = name, error = %e, "deprecation lookup failed");
                false
            }
        };
        Ok(Release {
            version,
            deprecated,
        })
    }
}
