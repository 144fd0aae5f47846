//! Classification of `composer.json` dependencies.
//!
//! Every `require` entry is either a Drupal core package, a Drupal module,
//! some other Composer package, or a platform entry that is never offered.

use crate::utils::validate_package_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DRUPAL_VENDOR: &str = "drupal/";

/// A dependency found in `composer.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Full Composer name, e.g. `drupal/gin` or `drush/drush`
    pub name: String,
    /// Identifier used to fetch releases: module slug for Drupal packages,
    /// full name otherwise
    pub module: String,
    /// Constraint currently in `require`
    pub version: String,
}

/// Which extraction pass a dependency belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    Core,
    Module,
    Other,
}

/// Module slug of a `drupal/*` package
pub fn module_name(name: &str) -> Option<&str> {
    name.strip_prefix(DRUPAL_VENDOR)
}

/// `core` and every `core-*` slug belong to Drupal core
pub fn is_core_package(slug: &str) -> bool {
    slug == "core" || slug.starts_with("core-")
}

/// Platform requirements, invalid names and core packages are never offered
/// as individual updates.
pub fn is_skippable(name: &str) -> bool {
    if validate_package_name(name).is_err() {
        return true;
    }
    if name == "php" || name == "composer" || name.starts_with("ext-") || name.starts_with("lib-")
    {
        return true;
    }
    module_name(name).is_some_and(is_core_package)
}

/// Classify a dependency name, `None` for entries that are dropped
pub fn classify(name: &str) -> Option<PackageKind> {
    match module_name(name) {
        Some(slug) if is_core_package(slug) => Some(PackageKind::Core),
        Some(_) => Some(PackageKind::Module),
        None if is_skippable(name) => None,
        None => Some(PackageKind::Other),
    }
}

/// Collect the `require` entries of one kind, sorted by full name
pub fn extract_packages(require: &BTreeMap<String, String>, kind: PackageKind) -> Vec<Package> {
    // BTreeMap iteration is already ordered by name
    require
        .iter()
        .filter(|(name, _)| classify(name) == Some(kind))
        .map(|(name, version)| Package::new(name, version))
        .collect()
}

impl Package {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            module: module_name(name).unwrap_or(name).to_string(),
            version: version.to_string(),
        }
    }

    pub fn kind(&self) -> Option<PackageKind> {
        classify(&self.name)
    }
}
