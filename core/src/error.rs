//! Error types for the CRM API client.
//!
//! # Design
//! Only failures the caller cannot get a response for are errors. A non-2xx
//! status is data (an `Envelope` with `error: true`) and an auth failure is an
//! `Outcome::AuthRequired`, so neither appears here.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not produce a response (network down, DNS, TLS).
    #[error("transport failed: {0}")]
    Transport(String),

    /// A request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The client configuration or an argument is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
