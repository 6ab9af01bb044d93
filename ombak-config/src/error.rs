//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

/// Unified configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid configuration: {}", flatten_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    #[error("configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),

    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders validation failures as one `field: reason` list so the whole
/// problem fits a single startup log line.
fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    for (field, errors) in errors.field_errors() {
        for error in errors {
            let reason = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            parts.push(format!("{field}: {reason}"));
        }
    }
    parts.sort();
    parts.join("; ")
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}
