//! Request and response bodies

use std::collections::BTreeMap;

use drupdate_core::types::{Package, Release};
use drupdate_manifest::ComposerJson;
use serde::{Deserialize, Serialize};

/// `POST /api/parse` body
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub composer_json: ComposerJson,
}

/// Updatable packages of a manifest, by section
#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub core_packages: Vec<Package>,
    pub drupal_packages: Vec<Package>,
    pub composer_packages: Vec<Package>,
}

impl From<&ComposerJson> for ParseResponse {
    fn from(manifest: &ComposerJson) -> Self {
        Self {
            core_packages: manifest.core_packages(),
            drupal_packages: manifest.module_packages(),
            composer_packages: manifest.other_packages(),
        }
    }
}

/// `GET /api/releases` response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReleasesResponse {
    pub package: String,
    pub releases: Vec<Release>,
}

/// `POST /api/update` body; `versions` maps package name to new constraint
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub composer_json: ComposerJson,
    #[serde(default)]
    pub versions: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
