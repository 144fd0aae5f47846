//! Release types for catalog responses and the offered choices.
//!
//! Two upstream shapes feed into one output shape: drupal.org release-history
//! entries (`CatalogRelease`) and Packagist version entries (`RegistryVersion`)
//! are both reduced to a `Release` carrying its Composer pin.

use super::Version;
use serde::{Deserialize, Serialize};

/// One `<release>` entry from a drupal.org release-history feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogRelease {
    pub name: String,
    pub version: String,
    pub status: String,
    pub core_compatibility: String,
}

impl CatalogRelease {
    /// Create a published release entry
    pub fn published(name: &str, version: &str, core_compatibility: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            status: "published".to_string(),
            core_compatibility: core_compatibility.to_string(),
        }
    }

    /// Unpublished and revoked releases are never offered
    pub fn is_published(&self) -> bool {
        self.status == "published"
    }
}

/// One entry of a Packagist `p2` package listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryVersion {
    pub version: String,
    pub version_normalized: String,
}

impl RegistryVersion {
    pub fn new(version: &str, version_normalized: &str) -> Self {
        Self {
            version: version.to_string(),
            version_normalized: version_normalized.to_string(),
        }
    }

    /// A version is stable when the raw string contains none of
    /// dev/alpha/beta/rc anywhere, in any case.
    pub fn is_stable(&self) -> bool {
        let raw = self.version.to_ascii_lowercase();
        !["dev", "alpha", "beta", "rc"]
            .iter()
            .any(|marker| raw.contains(marker))
    }

    /// Major line key: normalized version up to its first dot
    pub fn major_line(&self) -> &str {
        self.version_normalized
            .split('.')
            .next()
            .unwrap_or_default()
    }
}

/// An upgrade candidate offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Display name, e.g. `admin_toolbar 8.x-3.16`
    pub name: String,
    /// Version with any leading `v` removed
    pub version: String,
    /// Composer constraint to write into `require`
    #[serde(rename = "version_pin")]
    pub pin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_compatibility: Option<String>,
}

impl Release {
    /// Build a release, stripping a leading `v` from the version and
    /// computing its pin.
    pub fn new(name: impl Into<String>, version: &str, core_compatibility: Option<String>) -> Self {
        let version = version.strip_prefix('v').unwrap_or(version);
        Self {
            name: name.into(),
            version: version.to_string(),
            pin: Version::parse(version).pin(),
            core_compatibility,
        }
    }

    /// Parsed form of the release version
    pub fn parsed_version(&self) -> Version {
        Version::parse(&self.version)
    }
}

impl From<&CatalogRelease> for Release {
    fn from(release: &CatalogRelease) -> Self {
        let compat = Some(release.core_compatibility.clone()).filter(|c| !c.is_empty());
        Release::new(release.name.clone(), &release.version, compat)
    }
}
