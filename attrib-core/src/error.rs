//! Error types for attrib-core.

use thiserror::Error;

/// Result type for attrib-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for attrib-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document record violates a structural invariant.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Topic configuration could not be read or is malformed.
    #[error("Topic config error: {0}")]
    TopicConfig(String),
}

impl Error {
    /// Create an invalid document error.
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Error::InvalidDocument(msg.into())
    }

    /// Create a topic config error.
    pub fn topic_config(msg: impl Into<String>) -> Self {
        Error::TopicConfig(msg.into())
    }
}
