//! Composer package name validation.

use crate::error::{DrupdateError, DrupdateResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Composer's `vendor/package` naming rule
pub const PACKAGE_NAME_PATTERN: &str =
    r"^[a-z0-9]([_.-]?[a-z0-9]+)*/[a-z0-9](([_.]?|-{0,2})[a-z0-9]+)*$";

static PACKAGE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(PACKAGE_NAME_PATTERN).unwrap());

/// Reject names that could not belong to any registry before a request is built
pub fn validate_package_name(name: &str) -> DrupdateResult<()> {
    if PACKAGE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(DrupdateError::InvalidPackageName {
            name: name.to_string(),
            pattern: PACKAGE_NAME_PATTERN,
        })
    }
}
