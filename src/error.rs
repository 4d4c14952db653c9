//! Error types for the HAL client.
//!
//! Every failure mode of the traversal engine surfaces through [`Error`]:
//! malformed input, missing relations, unresolved template variables,
//! transport failures and invalid resource states. The engine never
//! retries a failed request; retry policy belongs to the caller or the
//! transport.

use serde_json::Value;
use thiserror::Error;

/// A specialized `Result` type for HAL client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all HAL client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input: a non-object patch or payload, a malformed
    /// permission string, an invalid field write.
    #[error("validation error: {0}")]
    Validation(String),

    /// The representation has no link for the requested relation.
    #[error("no link found for relation '{0}'")]
    Navigation(String),

    /// A URI template variable was left unresolved.
    #[error("unresolved template variable '{0}'")]
    Template(String),

    /// The server answered with a non-2xx status.
    #[error("request failed: status={status}, message={message}")]
    Request {
        /// HTTP status code of the response.
        status: u16,
        /// Status-derived, human-readable message.
        message: String,
        /// Raw response body for debugging.
        body: Value,
    },

    /// The operation is invalid for the resource's current state,
    /// e.g. saving without a `self` link or taking the first item of
    /// an empty list.
    #[error("resource error: {0}")]
    Resource(String),

    /// A list index was out of bounds.
    #[error("index {index} out of bounds for list of length {len}")]
    Index {
        /// The requested index.
        index: usize,
        /// The length of the list.
        len: usize,
    },

    /// Invalid client or environment setup.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP transport failed before a response was produced.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing or joining failed.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// HTTP status code of the failed request, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error indicates a client-side issue
    /// (invalid input, 4xx response, bad configuration).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Request { status, .. } => (400..500).contains(status),
            Error::Validation(_)
            | Error::Navigation(_)
            | Error::Template(_)
            | Error::Resource(_)
            | Error::Index { .. }
            | Error::Config(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Request { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Build a [`Error::Request`] from a non-2xx response.
    ///
    /// The message is taken from the body's `title` or `message` field
    /// when present, otherwise derived from the status class.
    pub(crate) fn from_status(status: u16, body: Value) -> Self {
        let message = body
            .get("title")
            .or_else(|| body.get("message"))
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| match status {
                401 => "authentication required".to_string(),
                403 => "forbidden".to_string(),
                404 => "resource not found".to_string(),
                s if s >= 500 => "server error".to_string(),
                _ => "client error".to_string(),
            });

        Error::Request {
            status,
            message,
            body,
        }
    }
}
