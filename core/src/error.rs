//! Error types for the Hakuna API client.
//!
//! # Design
//! `Configuration` is produced synchronously by `ClientConfig::build`, and
//! `UnsupportedMethod` by parsing an `HttpMethod`.
//! Every other variant is delivered through a `Call`, either as the `Err` of
//! the awaited future or as the argument of the completion callback.
//! `Application` keeps the decoded body untouched so callers can inspect
//! whatever shape the service chose for its error payload.

use serde_json::Value;
use thiserror::Error;

/// Errors produced while configuring the client or completing a call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required configuration was missing or malformed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The transport could not complete the round-trip.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A status-only (DELETE) call got something other than 200.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The service answered with a JSON body carrying an `error` field.
    #[error("service reported an error: {0}")]
    Application(Value),

    /// The response body is not valid JSON.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Encode(String),

    /// A method name outside GET, POST, PUT, PATCH and DELETE.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A callback was registered outside a tokio runtime.
    #[error("no async runtime to run the call: {0}")]
    Runtime(String),
}

impl ApiError {
    /// The numeric status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// The decoded body for `Application` errors.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Application(body) => Some(body),
            _ => None,
        }
    }
}

/// Failure reported by a `Transport` implementation.
#[derive(Debug, Error)]
#[error("transport failed: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::new(err.to_string())
    }
}
