//! Error types for urlsum operations.
//!
//! This module defines the main error type [`UrlsumError`] which represents
//! everything that can go wrong while talking to the extraction service or
//! reading and writing the local history, plus [`ValidationError`] for input
//! that is rejected before any request is made.
//!
//! # Example
//!
//! ```rust
//! use urlsum_core::{Result, UrlsumError};
//!
//! fn require_title(title: &str) -> Result<&str> {
//!     if title.is_empty() {
//!         return Err(UrlsumError::InvalidResponse("missing title".to_string()));
//!     }
//!     Ok(title)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Message used when the service fails without saying why.
pub const DEFAULT_SERVICE_MESSAGE: &str = "Failed to extract content";

/// Main error type for extraction and history operations.
#[derive(Error, Debug)]
pub enum UrlsumError {
    /// HTTP transport errors from reqwest.
    ///
    /// Covers DNS failures, refused connections and bodies that could not be read.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Only returned when a timeout was explicitly configured.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided, either for the service base or a submission.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The service answered with a non-success status.
    ///
    /// `message` is the `error` field of the JSON body, or
    /// [`DEFAULT_SERVICE_MESSAGE`] when the body did not carry one.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// The service answered 2xx but the body did not match the record schema.
    #[error("Unexpected response from extraction service: {0}")]
    InvalidResponse(String),

    /// Storage directory or file errors.
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding errors for stored history.
    #[error("Failed to serialize history: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors, e.g. a malformed environment variable.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl UrlsumError {
    /// Text shown to the user when this error becomes a failure record.
    ///
    /// Service errors surface the server's own message verbatim; everything
    /// else uses its display form.
    pub fn user_message(&self) -> String {
        match self {
            UrlsumError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for UrlsumError.
pub type Result<T> = std::result::Result<T, UrlsumError>;

/// Input rejected by client-side URL validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    Empty,

    #[error("Please enter a valid URL")]
    Invalid,
}
