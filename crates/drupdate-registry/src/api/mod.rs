//! drupal.org and Packagist response types

use std::collections::HashMap;

use drupdate_core::types::{CatalogRelease, RegistryVersion};
use drupdate_core::DrupdateError;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::RegistryResult;

/// `<project>` document from `release-history/{project}/current`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseHistory {
    /// Project title
    pub title: String,
    /// Comma-separated branch prefixes, e.g. `3.0.,4.0.`
    pub supported_branches: String,
    /// All releases, newest first within each branch
    pub releases: ReleaseList,
}

/// `<releases>` wrapper element
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseList {
    pub release: Vec<CatalogRelease>,
}

/// Packagist `p2/{vendor}/{package}.json` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagistResponse {
    /// Versions keyed by package name, newest first
    #[serde(default)]
    pub packages: HashMap<String, Vec<RegistryVersion>>,
}

impl ReleaseHistory {
    /// Decode a release-history document.
    ///
    /// drupal.org answers unknown projects with HTTP 200 and an `<error>`
    /// document, reported here as `PackageNotFound`.
    pub fn from_xml(project: &str, text: &str) -> RegistryResult<Self> {
        match root_element(text)?.as_deref() {
            Some("project") => {},
            Some("error") => {
                return Err(DrupdateError::PackageNotFound {
                    name: project.to_string(),
                })
            },
            Some(other) => {
                return Err(DrupdateError::Decode {
                    message: format!("unexpected <{}> document for {}", other, project),
                })
            },
            None => {
                return Err(DrupdateError::Decode {
                    message: format!("release history for {} is not an XML document", project),
                })
            },
        }

        quick_xml::de::from_str(text).map_err(|e| DrupdateError::Decode {
            message: format!("invalid release history for {}: {}", project, e),
        })
    }
}

impl PackagistResponse {
    pub fn from_json(package: &str, body: &[u8]) -> RegistryResult<Self> {
        serde_json::from_slice(body).map_err(|e| DrupdateError::Decode {
            message: format!("invalid Packagist response for {}: {}", package, e),
        })
    }

    /// Take the version list of one package; missing packages yield nothing
    pub fn into_versions(mut self, package: &str) -> Vec<RegistryVersion> {
        self.packages.remove(package).unwrap_or_default()
    }
}

/// Local name of the first element, `None` when the text has none
fn root_element(text: &str) -> RegistryResult<Option<String>> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(Some(
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ))
            },
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => continue,
            Err(e) => {
                return Err(DrupdateError::Decode {
                    message: format!("malformed XML: {}", e),
                })
            },
        }
    }
}
