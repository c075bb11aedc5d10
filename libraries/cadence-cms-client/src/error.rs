//! Error types for the CMS client.

use thiserror::Error;

/// Errors that can occur when talking to the CMS.
#[derive(Error, Debug)]
pub enum CmsClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// CMS returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no token available
    #[error("Authentication required")]
    AuthRequired,

    /// Authentication failed (invalid credentials or rejected registration)
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid CMS URL
    #[error("Invalid CMS URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse CMS response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// CMS is offline or unreachable
    #[error("CMS unreachable: {0}")]
    ServerUnreachable(String),
}

/// Result type for CMS client operations.
pub type Result<T> = std::result::Result<T, CmsClientError>;
