//! Release selection.
//!
//! Catalogs list every release ever made; only a handful are worth offering.
//! drupal.org feeds are reduced to the newest release per supported branch,
//! Packagist listings to the newest stable release per major line. Both
//! outputs are merged into one descending order by `sort_releases`.

use crate::types::{CatalogRelease, RegistryVersion, Release};
use std::collections::HashSet;

/// Picks one release per supported branch of a drupal.org project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchSelector {
    branches: Vec<String>,
    fallback_limit: Option<usize>,
}

impl BranchSelector {
    /// Parse a `supported_branches` value such as `"3.0.,4.0."`
    pub fn parse(supported: &str) -> Self {
        let branches = supported
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from)
            .collect();
        Self {
            branches,
            fallback_limit: None,
        }
    }

    /// Cap the number of releases returned when no branches are declared
    pub fn with_fallback_limit(mut self, limit: Option<usize>) -> Self {
        self.fallback_limit = limit;
        self
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Select releases in declared-branch order.
    ///
    /// Unpublished entries are ignored. A branch without a matching release
    /// contributes nothing. Without any declared branch every published
    /// release is returned, up to the fallback limit.
    pub fn select(&self, releases: &[CatalogRelease]) -> Vec<Release> {
        let published = releases.iter().filter(|r| r.is_published());

        if self.branches.is_empty() {
            let limit = self.fallback_limit.unwrap_or(usize::MAX);
            return published.take(limit).map(Release::from).collect();
        }

        self.branches
            .iter()
            .filter_map(|branch| {
                published
                    .clone()
                    .find(|r| r.version.starts_with(branch.as_str()))
            })
            .map(Release::from)
            .collect()
    }
}

/// Newest stable release of each major line from a newest-first listing
pub fn latest_stable_per_major(package: &str, versions: &[RegistryVersion]) -> Vec<Release> {
    let mut seen = HashSet::new();
    let mut releases = Vec::new();
    for v in versions {
        if !v.is_stable() || !seen.insert(v.major_line()) {
            continue;
        }
        let version = v.version.strip_prefix('v').unwrap_or(&v.version);
        releases.push(Release::new(format!("{} {}", package, version), version, None));
    }
    releases
}

/// Sort releases newest first
pub fn sort_releases(releases: &mut [Release]) {
    releases.sort_by(|a, b| b.parsed_version().compare(&a.parsed_version()));
}
