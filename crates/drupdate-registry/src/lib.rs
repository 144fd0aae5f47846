//! Release catalog client for drupdate
//!
//! This crate fetches release listings from drupal.org's release-history API
//! and Packagist's p2 API and reduces them to sorted `Release` choices.

pub mod api;
pub mod client;

// Re-export main types
pub use api::{PackagistResponse, ReleaseHistory, ReleaseList};
pub use client::{ClientConfig, RegistryClient, ReleaseSource};

use drupdate_core::error::DrupdateError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, DrupdateError>;
