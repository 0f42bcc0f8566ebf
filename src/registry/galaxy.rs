//! Galaxy collection registry adapter
//!
//! Fetches collection metadata from a Galaxy v3 API.
//! API endpoints:
//! - {base}/api/v3/plugin/ansible/content/published/collections/index/{namespace}/{name}/
//! - {base}/api/v3/plugin/ansible/content/published/collections/index/{namespace}/{name}/versions/{version}/

use crate::domain::{parse_version, Dependency, PackageMetadata, Version, VersionRange};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient, Release};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Public Galaxy base URL
pub const DEFAULT_GALAXY_URL: &str = "https://galaxy.ansible.com";

/// Path of the collection index below the base URL
const INDEX_PATH: &str = "api/v3/plugin/ansible/content/published/collections/index";

/// Galaxy registry adapter
pub struct GalaxyAdapter {
    client: HttpClient,
    base_url: String,
}

/// Collection index response
#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    deprecated: bool,
    highest_version: HighestVersion,
}

#[derive(Debug, Deserialize)]
struct HighestVersion {
    version: String,
}

/// Collection version detail response
#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(default)]
    metadata: VersionMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct VersionMetadata {
    /// Dependency name to range; map order follows the document
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
}

impl GalaxyAdapter {
    /// Create a new adapter for the public Galaxy
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_GALAXY_URL)
    }

    /// Create a new adapter for a custom Galaxy server
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the index URL for a collection (`namespace.name`)
    fn build_url(&self, name: &str) -> Result<String, RegistryError> {
        let (namespace, collection) = split_name(name)
            .ok_or_else(|| RegistryError::package_not_found(name, self.registry_name()))?;
        Ok(format!(
            "{}/{}/{}/{}/",
            self.base_url, INDEX_PATH, namespace, collection
        ))
    }

    async fn fetch_collection(&self, name: &str) -> Result<CollectionResponse, RegistryError> {
        let url = self.build_url(name)?;
        self.client
            .get_json(&url, name, self.registry_name())
            .await
    }

    fn parse_highest(
        &self,
        name: &str,
        collection: &CollectionResponse,
    ) -> Result<Version, RegistryError> {
        parse_version(&collection.highest_version.version).map_err(|e| {
            RegistryError::invalid_response(name, self.registry_name(), e.to_string())
        })
    }
}

/// Split `namespace.name` into its two parts
fn split_name(name: &str) -> Option<(&str, &str)> {
    let (namespace, collection) = name.split_once('.')?;
    if namespace.is_empty() || collection.is_empty() || collection.contains('.') {
        return None;
    }
    Some((namespace, collection))
}

#[async_trait]
impl RegistryClient for GalaxyAdapter {
    fn registry_name(&self) -> &'static str {
        "Galaxy"
    }

    async fn exists(&self, name: &str) -> Result<bool, RegistryError> {
        match self.fetch_collection(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn fetch_metadata(&self, name: &str) -> Result<PackageMetadata, RegistryError> {
        let collection = self.fetch_collection(name).await?;
        let version = self.parse_highest(name, &collection)?;

        let url = format!("{}versions/{}/", self.build_url(name)?, version);
        let detail: VersionResponse = self
            .client
            .get_json(&url, name, self.registry_name())
            .await?;

        let mut metadata = PackageMetadata::new(name).with_deprecated(collection.deprecated);
        for (dep_name, raw_range) in detail.metadata.dependencies {
            let raw_range = raw_range.as_str().ok_or_else(|| {
                RegistryError::invalid_response(
                    name,
                    self.registry_name(),
                    format!("dependency '{}' has a non-string range", dep_name),
                )
            })?;
            let range = VersionRange::parse(raw_range).map_err(|e| {
                RegistryError::invalid_response(name, self.registry_name(), e.to_string())
            })?;
            metadata.dependencies.push(Dependency::new(dep_name, range));
        }

        debug!(
            package = name,
            version = %version,
            dependencies = metadata.dependencies.len(),
            "fetched metadata"
        );
        Ok(metadata)
    }

    async fn is_deprecated(&self, name: &str) -> Result<bool, RegistryError> {
        Ok(self.fetch_collection(name).await?.deprecated)
    }

    async fn latest_version(&self, name: &str) -> Result<Version, RegistryError> {
        let collection = self.fetch_collection(name).await?;
        self.parse_highest(name, &collection)
    }

    async fn latest_release(&self, name: &str) -> Result<Release, RegistryError> {
        let collection = self.fetch_collection(name).await?;
        Ok(Release {
            version: self.parse_highest(name, &collection)?,
            deprecated: collection.deprecated,
        })
    }
}
