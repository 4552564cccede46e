//! Error types for the expense API client and store.
//!
//! # Design
//! One enum covers the whole client. `Network` means no response arrived at
//! all; `Service` means the server answered with a non-2xx status. The
//! `Display` of `Service` is the server's own message so it can be shown (and
//! stored) as-is.
//!
//! `ApiError` is `Clone` because the store keeps failure messages in its state
//! and reports rolled-back adds to callers after logging them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The server returned a non-2xx status.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// An expense draft was rejected before anything was sent.
    #[error("invalid expense: {0}")]
    Validation(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A list refetch was overtaken by a newer request before it could
    /// commit.
    #[error("refresh superseded by a newer request")]
    Superseded,

    #[error("config error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}
