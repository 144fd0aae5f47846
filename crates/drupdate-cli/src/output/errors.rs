//! Error message formatting with actionable suggestions.

use super::colors::ColorSupport;
use drupdate_core::error::DrupdateError;
use std::error::Error;

/// Renders errors as `error: ...`, an optional `help: ...` line and the
/// cause chain.
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format a drupdate error with its suggestion and sources
    pub fn format_error(&self, error: &DrupdateError) -> String {
        let mut output = self.format_simple(&error.to_string());
        output.push('\n');

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        self.push_causes(&mut output, error.source());
        output
    }

    /// Format any error reaching the top of the binary
    pub fn format_any(&self, error: &anyhow::Error) -> String {
        if let Some(inner) = error.downcast_ref::<DrupdateError>() {
            return self.format_error(inner);
        }
        let mut output = self.format_simple(&error.to_string());
        output.push('\n');
        self.push_causes(&mut output, error.source());
        output
    }

    pub fn format_simple(&self, message: &str) -> String {
        format!("{}: {}", self.colors.red("error"), message)
    }

    fn push_causes(&self, output: &mut String, mut source: Option<&(dyn Error + 'static)>) {
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
