//! # drupdate-core
//!
//! Core types and release selection shared across all drupdate crates.
//!
//! This crate provides:
//! - `Version`, a permissive parser for drupal.org and Packagist version strings
//! - `Release`, `CatalogRelease` and `RegistryVersion` catalog types
//! - Branch and major-line release selectors
//! - Package classification for `composer.json` dependency names
//! - `DrupdateError` enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Release, Package)
//! - `select`: Picking the releases worth presenting from a catalog response
//! - `error`: Error types and result aliases
//! - `utils`: Package name validation

pub mod error;
pub mod select;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{DrupdateError, DrupdateResult};
pub use select::{latest_stable_per_major, sort_releases, BranchSelector};
pub use types::{
    CatalogRelease, Package, PackageKind, RegistryVersion, Release, Stability, Version,
};
