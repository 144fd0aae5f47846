//! Core data types for drupdate.
//!
//! This module provides the fundamental types used throughout drupdate:
//! - Version parsing and Composer pin rendering
//! - Catalog release entries and the releases offered to users
//! - `composer.json` dependency classification

pub mod package;
pub mod release;
pub mod version;

// Re-export all public types
pub use package::{classify, extract_packages, Package, PackageKind};
pub use release::{CatalogRelease, RegistryVersion, Release};
pub use version::{Stability, Version};
