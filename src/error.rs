// src/error.rs

//! Unified error handling for the discovery pipeline.
//!
//! `AppError` covers configuration, validation and I/O failures that stop an
//! operation. Source-level problems are modeled separately by `SourceError`
//! and `ParseWarning`: they degrade a discovery run but never abort it.

use std::fmt;

use thiserror::Error;

use crate::models::SourceKind;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Location table error
    #[error("Location error: {0}")]
    Location(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a location table error.
    pub fn location(message: impl Into<String>) -> Self {
        Self::Location(message.into())
    }
}

/// A single adapter call failed.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network or body read failure
    #[error("{source_kind}: request failed: {error}")]
    Http {
        source_kind: SourceKind,
        #[source]
        error: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("{source_kind}: HTTP status {status} for {url}")]
    Status {
        source_kind: SourceKind,
        status: u16,
        url: String,
    },

    /// The request did not finish within the client timeout
    #[error("{source_kind}: request timed out")]
    Timeout { source_kind: SourceKind },

    /// The search URL could not be built from the board configuration
    #[error("{source_kind}: invalid search URL: {message}")]
    InvalidUrl {
        source_kind: SourceKind,
        message: String,
    },

    /// The whole page could not be interpreted
    #[error("{source_kind}: unparsable page: {message}")]
    UnparsablePage {
        source_kind: SourceKind,
        message: String,
    },

    /// A configured CSS selector is invalid
    #[error("{source_kind}: invalid selector '{selector}': {message}")]
    Selector {
        source_kind: SourceKind,
        selector: String,
        message: String,
    },
}

impl SourceError {
    /// Classify a reqwest failure for a source.
    pub fn http(source_kind: SourceKind, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout { source_kind }
        } else {
            Self::Http { source_kind, error }
        }
    }

    /// Create an unparsable page error.
    pub fn unparsable(source_kind: SourceKind, message: impl fmt::Display) -> Self {
        Self::UnparsablePage {
            source_kind,
            message: message.to_string(),
        }
    }

    /// Create a selector error.
    pub fn selector(
        source_kind: SourceKind,
        selector: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Selector {
            source_kind,
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// The source this error belongs to.
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::Http { source_kind, .. }
            | Self::Status { source_kind, .. }
            | Self::Timeout { source_kind }
            | Self::InvalidUrl { source_kind, .. }
            | Self::UnparsablePage { source_kind, .. }
            | Self::Selector { source_kind, .. } => *source_kind,
        }
    }
}

/// One listing inside an otherwise usable page was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source_kind}: skipped listing #{index}: {reason}")]
pub struct ParseWarning {
    pub source_kind: SourceKind,
    pub index: usize,
    pub reason: String,
}

impl ParseWarning {
    pub fn new(source_kind: SourceKind, index: usize, reason: impl Into<String>) -> Self {
        Self {
            source_kind,
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_reports_its_source() {
        let err = SourceError::unparsable(SourceKind::PNet, "no listing container");
        assert_eq!(err.source_kind(), SourceKind::PNet);
        assert_eq!(
            err.to_string(),
            "PNet: unparsable page: no listing container"
        );
    }

    #[test]
    fn parse_warning_display() {
        let warning = ParseWarning::new(SourceKind::CareerJunction, 3, "missing company");
        assert_eq!(
            warning.to_string(),
            "CareerJunction: skipped listing #3: missing company"
        );
    }
}
