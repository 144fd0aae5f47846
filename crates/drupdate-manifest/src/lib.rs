//! composer.json handling for drupdate
//!
//! This crate decodes a `composer.json` document into its `require` map plus
//! an ordered bag of every other top-level field, and encodes it back with
//! only `require` rewritten.

pub mod composer;

// Re-export main types
pub use composer::{load_from_file, write_to_file, ComposerJson};

use drupdate_core::error::DrupdateError;

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, DrupdateError>;
