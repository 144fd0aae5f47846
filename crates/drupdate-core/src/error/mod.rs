//! Error types and result aliases for drupdate operations.
//!
//! Provides a unified error type that covers every failure the manifest codec,
//! the registry client and the front-ends can report, with actionable messages.

use thiserror::Error;

/// Unified error type for all drupdate operations
#[derive(Error, Debug)]
pub enum DrupdateError {
    // Manifest errors
    #[error("Failed to parse composer.json: {message}")]
    ManifestParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    Config { field: String, reason: String },

    // Package name errors
    #[error("invalid package name {name:?}: must match {pattern}")]
    InvalidPackageName { name: String, pattern: &'static str },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Registry returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode registry response: {message}")]
    Decode { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for drupdate operations
pub type DrupdateResult<T> = Result<T, DrupdateError>;

impl DrupdateError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Check if this error only affects the package being fetched
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DrupdateError::Network { .. }
                | DrupdateError::HttpStatus { .. }
                | DrupdateError::Decode { .. }
                | DrupdateError::PackageNotFound { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            DrupdateError::ManifestParse { .. } => {
                Some("Check that composer.json is a valid JSON object")
            },
            DrupdateError::InvalidPackageName { .. } => {
                Some("Package names are lowercase and look like 'vendor/package'")
            },
            DrupdateError::PackageNotFound { .. } => {
                Some("Check the package name spelling or whether the project still exists")
            },
            DrupdateError::Network { .. } => Some("Check your internet connection and try again"),
            DrupdateError::HttpStatus { .. } => {
                Some("The registry may be unavailable; try again later or check the base URL")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_package_name_message_prefix() {
        let err = DrupdateError::InvalidPackageName {
            name: "Drupal/Gin".to_string(),
            pattern: "^x$",
        };
        assert!(err.to_string().starts_with("invalid package name"));
        assert!(err.to_string().contains("\"Drupal/Gin\""));
    }

    #[test]
    fn test_recoverable_errors() {
        let status = DrupdateError::HttpStatus {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert!(status.is_recoverable());

        let parse = DrupdateError::ManifestParse {
            message: "oops".to_string(),
        };
        assert!(!parse.is_recoverable());
        assert!(parse.suggestion().is_some());
    }
}
