//! Error types for the appLariat API client.
//!
//! # Design
//! `NotFound` has its own variant so callers can tell "the record does not
//! exist" apart from other unexpected statuses. All other non-2xx responses
//! land in `HttpError`, which keeps the raw status and body.

use thiserror::Error;

/// Errors returned by the transport, the request helpers and the services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 404. The requested record does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be decoded into the expected envelope.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The configured base URL cannot be used as a base for resource paths.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// A record id that cannot name a single record (empty, `.` or `..`).
    #[error("invalid record id {0:?}")]
    InvalidId(String),

    /// A default header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// The HTTP status this error was produced from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
