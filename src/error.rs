// src/error.rs

//! Unified error handling for the collector and server.

use std::fmt;

use thiserror::Error;

/// Result type alias for collector operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (timeout, connection refused, body read)
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

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Upstream answered with a non-success status
    #[error("{source_name} returned HTTP {status} for {url}")]
    Status {
        source_name: String,
        url: String,
        status: u16,
    },

    /// Payload did not have the expected shape
    #[error("Decode error for {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Every fetcher of a pipeline run failed
    #[error("All sources failed for {kind}: {errors}")]
    AllSourcesFailed { kind: String, errors: String },

    /// A run finished without producing any item
    #[error("Pipeline for {0} produced no items")]
    EmptyResult(String),

    /// A run of the same job is already in progress
    #[error("Pipeline for {0} is already running")]
    AlreadyRunning(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create an unexpected-status error.
    pub fn status(source_name: impl Into<String>, url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            source_name: source_name.into(),
            url: url.into(),
            status,
        }
    }

    /// Create a decode error with the source it came from.
    pub fn decode(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            source_name: source_name.into(),
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

    /// Collapse the per-source errors of a failed run into one error.
    pub fn all_sources_failed(kind: impl fmt::Display, errors: &[AppError]) -> Self {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::AllSourcesFailed {
            kind: kind.to_string(),
            errors: joined,
        }
    }
}
