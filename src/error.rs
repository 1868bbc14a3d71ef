// src/error.rs

//! Unified error handling for the case-count crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The detail page does not carry the case table at the expected position
    #[error("Expected a table at position {index} on {url}, found {found} table(s)")]
    MissingTable {
        url: String,
        index: usize,
        found: usize,
    },

    /// A case table row does not have the fixed column layout
    #[error("Row {row} on {url} has {found} cell(s), expected at least {expected}")]
    MalformedRow {
        url: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A keyed document already exists
    #[error("Document '{key}' already exists in '{kind}'")]
    Conflict { kind: String, key: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an S3 error from any displayable SDK error.
    pub fn s3(message: impl fmt::Display) -> Self {
        Self::S3(message.to_string())
    }

    /// Whether this is a 404 answer from the remote site.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = AppError::Status {
            url: "https://example.com/x".to_string(),
            status: 404,
        };
        assert!(err.is_not_found());

        let err = AppError::Status {
            url: "https://example.com/x".to_string(),
            status: 500,
        };
        assert!(!err.is_not_found());
        assert!(!AppError::config("x").is_not_found());
    }

    #[test]
    fn test_malformed_row_message() {
        let err = AppError::MalformedRow {
            url: "https://example.com/detail".to_string(),
            row: 3,
            expected: 8,
            found: 5,
        };
        assert_eq!(
            err.to_string(),
            "Row 3 on https://example.com/detail has 5 cell(s), expected at least 8"
        );
    }
}
