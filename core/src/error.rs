//! Error types for the billing API client.
//!
//! # Design
//! Failures split into two families. Construction failures
//! (`InvalidRequest`, `Serialization`, `Configuration`) happen before any
//! I/O and never carry a response. Transport failures (`Transport`,
//! `Decode`) happen during or after the round-trip; `Decode` keeps the
//! response that was received so callers can still inspect its status and
//! headers.
//!
//! A 4xx/5xx status is not an error here. The remote answered, and the
//! caller reads `Response::status` and `Response::errors`.

use thiserror::Error;

use crate::client::Response;

/// Errors returned by `Client` and `BillingService`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request URL could not be built from the base URL and path segments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The executor could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A response arrived but its body was not the expected JSON.
    #[error("HTTP {}: deserialization failed: {message}", .response.status)]
    Decode {
        response: Box<Response>,
        message: String,
    },

    /// Client configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// The response received before the failure, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ApiError::Decode { response, .. } => Some(response),
            _ => None,
        }
    }
}
