//! In-memory registry
//!
//! Serves package metadata from a fixed table. Supports per-package response
//! latency and injected failures, which makes it suitable for exercising the
//! audit's concurrency and failure isolation without a network.

use crate::domain::{PackageMetadata, Version};
use crate::error::RegistryError;
use crate::registry::{RegistryClient, Release};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const REGISTRY_NAME: &str = "in-memory";

#[derive(Debug, Clone)]
struct Entry {
    metadata: PackageMetadata,
    latest: Version,
    latency: Option<Duration>,
    failure: Option<RegistryError>,
}

/// Registry backed by an in-process table
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    packages: HashMap<String, Entry>,
    metadata_calls: AtomicUsize,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package with its metadata and latest version
    pub fn with_package(mut self, metadata: PackageMetadata, latest: Version) -> Self {
        self.packages.insert(
            metadata.name.clone(),
            Entry {
                metadata,
                latest,
                latency: None,
                failure: None,
            },
        );
        self
    }

    /// Delay every response for a registered package
    pub fn with_latency(mut self, name: &str, latency: Duration) -> Self {
        if let Some(entry) = self.packages.get_mut(name) {
            entry.latency = Some(latency);
        }
        self
    }

    /// Make metadata and version lookups for a registered package fail
    pub fn with_failure(mut self, name: &str, failure: RegistryError) -> Self {
        if let Some(entry) = self.packages.get_mut(name) {
            entry.failure = Some(failure);
        }
        self
    }

    /// Number of `fetch_metadata` calls served so far
    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    async fn lookup(&self, name: &str) -> Result<&Entry, RegistryError> {
        let entry = self
            .packages
            .get(name)
            .ok_or_else(|| RegistryError::package_not_found(name, REGISTRY_NAME))?;
        if let Some(latency) = entry.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(entry)
    }

    async fn lookup_healthy(&self, name: &str) -> Result<&Entry, RegistryError> {
        let entry = self.lookup(name).await?;
        match &entry.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(entry),
        }
    }
}

#[async_trait]
impl RegistryClient for InMemoryRegistry {
    fn registry_name(&self) -> &'static str {
        REGISTRY_NAME
    }

    async fn exists(&self, name: &str) -> Result<bool, RegistryError> {
        match self.lookup(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn fetch_metadata(&self, name: &str) -> Result<PackageMetadata, RegistryError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup_healthy(name).await?.metadata.clone())
    }

    async fn is_deprecated(&self, name: &str) -> Result<bool, RegistryError> {
        Ok(self.lookup_healthy(name).await?.metadata.deprecated)
    }

    async fn latest_version(&self, name: &str) -> Result<Version, RegistryError> {
        Ok(self.lookup_healthy(name).await?.latest.clone())
    }

    async fn latest_release(&self, name: &str) -> Result<Release, RegistryError> {
        let entry = self.lookup_healthy(name).await?;
        Ok(Release {
            version: entry.latest.clone(),
            deprecated: entry.metadata.deprecated,
        })
    }
}
