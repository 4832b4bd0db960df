//! Error types for tiktok-dl
//!
//! This module provides error handling for the library, including:
//! - The domain error taxonomy (invalid input, unresolvable URL, failed fetch, I/O)
//! - HTTP status code mapping for the API
//! - The JSON error body returned to clients

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for tiktok-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tiktok-dl
///
/// Every failure of a download request ends up as one of these variants. Resolution
/// strategy failures never appear here individually; they collapse into
/// [`Error::NotResolvable`] once the whole chain has been tried.
#[derive(Debug, Error)]
pub enum Error {
    /// The submitted page URL is missing or does not belong to the platform
    #[error("{0}")]
    InvalidInput(String),

    /// No resolution strategy produced a direct media URL
    #[error("could not extract video URL from {url}")]
    NotResolvable {
        /// The page URL that could not be resolved
        url: String,
    },

    /// The media host answered with a non-success status
    #[error("media host returned HTTP {status} for {url}")]
    FetchFailed {
        /// Upstream HTTP status code
        status: u16,
        /// The direct media URL that was requested
        url: String,
    },

    /// I/O error (download directory, temp file, rename)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "platform.origin")
        key: Option<String>,
    },

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// API error response format
///
/// Returned as the body of every non-200 response from `POST /api/download`.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "could not extract video URL from https://www.tiktok.com/@u/video/1",
///   "code": "not_resolvable"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message, suitable for showing to end users
    pub error: String,

    /// Machine-readable error code (e.g., "invalid_input", "fetch_failed")
    pub code: String,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }

    /// Create a "bad request" error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the user submitted something we cannot work with
            Error::InvalidInput(_) => 400,
            Error::NotResolvable { .. } => 400,

            // 500 Internal Server Error - everything else, upstream failures included
            Error::FetchFailed { .. } => 500,
            Error::Io(_) => 500,
            Error::Network(_) => 500,
            Error::Serialization(_) => 500,
            Error::Config { .. } => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::NotResolvable { .. } => "not_resolvable",
            Error::FetchFailed { .. } => "fetch_failed",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Config { .. } => "config_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError {
            code: error.error_code().to_string(),
            error: error.to_string(),
        }
    }
}
