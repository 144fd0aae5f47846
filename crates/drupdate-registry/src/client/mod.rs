//! HTTP client for the drupal.org and Packagist release catalogs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::api::{PackagistResponse, ReleaseHistory};
use crate::RegistryResult;
use drupdate_core::error::DrupdateError;
use drupdate_core::select::{latest_stable_per_major, sort_releases, BranchSelector};
use drupdate_core::types::package::{is_core_package, module_name};
use drupdate_core::types::Release;
use drupdate_core::utils::validate_package_name;

/// drupal.org project that carries core releases
const CORE_PROJECT: &str = "drupal";

/// Settings for the release catalogs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// drupal.org release-history base URL
    pub module_base_url: String,
    /// Packagist base URL
    pub registry_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
    /// Cap on releases returned for projects without supported branches
    pub fallback_limit: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            module_base_url: "https://updates.drupal.org/release-history".to_string(),
            registry_base_url: "https://repo.packagist.org".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("drupdate/", env!("CARGO_PKG_VERSION")).to_string(),
            fallback_limit: None,
        }
    }
}

impl ClientConfig {
    /// Check that both base URLs are absolute http(s) URLs
    pub fn validate(&self) -> RegistryResult<()> {
        for (field, value) in [
            ("module_base_url", &self.module_base_url),
            ("registry_base_url", &self.registry_base_url),
        ] {
            let parsed = url::Url::parse(value).map_err(|e| DrupdateError::Config {
                field: field.to_string(),
                reason: format!("'{}' is not a valid URL: {}", value, e),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DrupdateError::Config {
                    field: field.to_string(),
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }
        if self.timeout.is_zero() {
            return Err(DrupdateError::Config {
                field: "timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Anything that can list upgrade candidates for a Composer package
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Releases for a package, newest first
    async fn fetch_releases(&self, package: &str) -> RegistryResult<Vec<Release>>;
}

/// Release catalog client. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    config: ClientConfig,
}

impl RegistryClient {
    /// Create a client for the public catalogs
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> RegistryResult<Self> {
        config.validate()?;

        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .gzip(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DrupdateError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Latest release per supported branch of a drupal.org project
    pub async fn fetch_module_releases(&self, project: &str) -> RegistryResult<Vec<Release>> {
        let url = format!(
            "{}/{}/current",
            self.config.module_base_url.trim_end_matches('/'),
            project
        );
        let body = self.get(&url).await?;
        let text = String::from_utf8_lossy(&body);
        let history = ReleaseHistory::from_xml(project, &text)?;

        let selector = BranchSelector::parse(&history.supported_branches)
            .with_fallback_limit(self.config.fallback_limit);
        let mut releases = selector.select(&history.releases.release);
        sort_releases(&mut releases);

        debug!(
            project,
            branches = selector.branches().len(),
            releases = releases.len(),
            "selected module releases"
        );
        Ok(releases)
    }

    /// Latest stable release per major line of a Packagist package
    pub async fn fetch_registry_releases(&self, package: &str) -> RegistryResult<Vec<Release>> {
        let url = format!(
            "{}/p2/{}.json",
            self.config.registry_base_url.trim_end_matches('/'),
            package
        );
        let body = self.get(&url).await?;
        let versions = PackagistResponse::from_json(package, &body)?.into_versions(package);

        let mut releases = latest_stable_per_major(package, &versions);
        sort_releases(&mut releases);

        debug!(
            package,
            versions = versions.len(),
            releases = releases.len(),
            "selected registry releases"
        );
        Ok(releases)
    }

    /// Route a Composer package to its catalog.
    ///
    /// Core packages share the `drupal` project, other `drupal/*` packages
    /// use their module slug, everything else goes to Packagist. Invalid
    /// names are rejected before any request is made.
    pub async fn fetch_releases(&self, package: &str) -> RegistryResult<Vec<Release>> {
        validate_package_name(package)?;

        match module_name(package) {
            Some(slug) if is_core_package(slug) => self.fetch_module_releases(CORE_PROJECT).await,
            Some(slug) => self.fetch_module_releases(slug).await,
            None => self.fetch_registry_releases(package).await,
        }
    }

    /// GET a URL and return the body of a successful response
    async fn get(&self, url: &str) -> RegistryResult<Vec<u8>> {
        debug!(url, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DrupdateError::network(format!("Failed to fetch {}", url), e))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(DrupdateError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DrupdateError::network(format!("Failed to read {}", url), e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ReleaseSource for RegistryClient {
    async fn fetch_releases(&self, package: &str) -> RegistryResult<Vec<Release>> {
        RegistryClient::fetch_releases(self, package).await
    }
}

#[cfg(test)]
mod tests;
