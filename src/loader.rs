//! Managed package list loading
//!
//! The list is a YAML sequence of package identifiers, read from a local
//! file or downloaded from an `http(s)://` URL:
//!
//! ```yaml
//! - acme/bar
//! - acme/baz
//! ```

use crate::error::LoadError;
use crate::registry::HttpClient;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Package list used when no source is given
pub const DEFAULT_PACKAGE_LIST: &str = "packages.yml";

/// A resolved managed package list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageList {
    /// Package identifiers in list order
    pub names: Vec<String>,
    /// Where the list came from
    pub source: String,
    /// Whether this is the default list
    pub is_default: bool,
}

impl PackageList {
    /// Create a package list from names already in memory
    pub fn new(names: Vec<String>, source: impl Into<String>) -> Self {
        Self {
            names,
            source: source.into(),
            is_default: false,
        }
    }

    /// Parse YAML content into a package list
    pub fn from_yaml(content: &str, source: &str) -> Result<Self, LoadError> {
        let names: Vec<String> = serde_yaml::from_str(content)
            .map_err(|e| LoadError::parse_error(source, e.to_string()))?;

        let mut trimmed = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                return Err(LoadError::EmptyEntry {
                    source_name: source.to_string(),
                    index,
                });
            }
            trimmed.push(name.to_string());
        }

        Ok(Self::new(trimmed, source))
    }
}

/// Capability for resolving the managed package list
#[async_trait]
pub trait PackageListLoader: Send + Sync {
    /// Resolve the list
    async fn load(&self) -> Result<PackageList, LoadError>;
}

#[async_trait]
impl PackageListLoader for PackageList {
    async fn load(&self) -> Result<PackageList, LoadError> {
        Ok(self.clone())
    }
}

/// Location of a YAML package list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Local file
    File(PathBuf),
    /// Remote resource
    Url(String),
}

impl Location {
    /// Interpret a user-supplied source as a URL or a file path
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Location::Url(source.to_string())
        } else {
            Location::File(PathBuf::from(source))
        }
    }

    fn display(&self) -> String {
        match self {
            Location::File(path) => path.display().to_string(),
            Location::Url(url) => url.clone(),
        }
    }
}

/// Loads a package list from a YAML file or URL
pub struct YamlPackageList {
    location: Location,
    is_default: bool,
    client: HttpClient,
}

impl YamlPackageList {
    /// Create a loader for the given source, falling back to the default list
    pub fn new(source: Option<&str>, client: HttpClient) -> Self {
        match source {
            Some(source) => Self {
                location: Location::parse(source),
                is_default: false,
                client,
            },
            None => Self {
                location: Location::File(PathBuf::from(DEFAULT_PACKAGE_LIST)),
                is_default: true,
                client,
            },
        }
    }

    /// Get the location this loader reads from
    pub fn location(&self) -> &Location {
        &self.location
    }

    async fn read(&self) -> Result<String, LoadError> {
        match &self.location {
            Location::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| LoadError::ReadError {
                        path: path.clone(),
                        source,
                    })
            }
            Location::Url(url) => {
                let fetch_error = |message: String| LoadError::FetchError {
                    url: url.clone(),
                    message,
                };
                let response = self
                    .client
                    .inner()
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| fetch_error(e.to_string()))?;
                if !response.status().is_success() {
                    return Err(fetch_error(format!("HTTP {}", response.status())));
                }
                response.text().await.map_err(|e| fetch_error(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl PackageListLoader for YamlPackageList {
    async fn load(&self) -> Result<PackageList, LoadError> {
        let source = self.location.display();
        let content = self.read().await?;
        let mut list = PackageList::from_yaml(&content, &source)?;
        list.is_default = self.is_default;
        debug!(source = %source, packages = list.names.len(), "loaded package list");
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_yaml() {
        let list = PackageList::from_yaml("- acme/bar\n- acme/baz\n", "test").unwrap();
        assert_eq!(list.names, vec!["acme/bar", "acme/baz"]);
        assert_eq!(list.source, "test");
        assert!(!list.is_default);
    }

    #[test]
    fn test_from_yaml_keeps_duplicates_and_order() {
        let list = PackageList::from_yaml("[acme/z, acme/a, acme/z]", "test").unwrap();
        assert_eq!(list.names, vec!["acme/z", "acme/a", "acme/z"]);
    }

    #[test]
    fn test_from_yaml_empty_list() {
        let list = PackageList::from_yaml("[]", "test").unwrap();
        assert!(list.names.is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_mapping() {
        let result = PackageList::from_yaml("packages:\n  - acme/bar\n", "test");
        assert!(matches!(result, Err(LoadError::ParseError { .. })));
    }

    #[test]
    fn test_from_yaml_rejects_nested_values() {
        let result = PackageList::from_yaml("- acme/bar\n- [acme/baz]\n", "test");
        assert!(matches!(result, Err(LoadError::ParseError { .. })));
    }

    #[test]
    fn test_from_yaml_rejects_blank_entry() {
        let result = PackageList::from_yaml("- acme/bar\n- '  '\n", "test");
        assert!(matches!(result, Err(LoadError::EmptyEntry { index: 1, .. })));
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(
            Location::parse("https://example.com/list.yml"),
            Location::Url("https://example.com/list.yml".to_string())
        );
        assert_eq!(
            Location::parse("lists/packages.yml"),
            Location::File(PathBuf::from("lists/packages.yml"))
        );
    }

    #[test]
    fn test_default_location() {
        let loader = YamlPackageList::new(None, HttpClient::new().unwrap());
        assert_eq!(
            loader.location(),
            &Location::File(PathBuf::from(DEFAULT_PACKAGE_LIST))
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.yml");
        fs::write(&path, "- acme/bar\n").unwrap();

        let loader = YamlPackageList::new(path.to_str(), HttpClient::new().unwrap());
        let list = loader.load().await.unwrap();

        assert_eq!(list.names, vec!["acme/bar"]);
        assert!(!list.is_default);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yml");

        let loader = YamlPackageList::new(path.to_str(), HttpClient::new().unwrap());
        let result = loader.load().await;

        assert!(matches!(result, Err(LoadError::ReadError { .. })));
    }

    #[tokio::test]
    async fn test_load_from_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/packages.yml")
            .with_status(200)
            .with_body("- acme/bar\n- acme/qux\n")
            .create_async()
            .await;

        let url = format!("{}/packages.yml", server.url());
        let loader = YamlPackageList::new(Some(&url), HttpClient::new().unwrap());
        let list = loader.load().await.unwrap();

        mock.assert_async().await;
        assert_eq!(list.names, vec!["acme/bar", "acme/qux"]);
        assert_eq!(list.source, url);
    }

    #[tokio::test]
    async fn test_load_from_url_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/packages.yml")
            .with_status(403)
            .create_async()
            .await;

        let url = format!("{}/packages.yml", server.url());
        let loader = YamlPackageList::new(Some(&url), HttpClient::new().unwrap());

        assert!(matches!(
            loader.load().await,
            Err(LoadError::FetchError { .. })
        ));
    }
}
