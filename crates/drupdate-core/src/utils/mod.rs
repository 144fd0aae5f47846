//! Utility functions and helpers.
//!
//! Common functionality used across multiple drupdate crates.

pub mod name;

// Re-export commonly used utilities
pub use name::{validate_package_name, PACKAGE_NAME_PATTERN};
