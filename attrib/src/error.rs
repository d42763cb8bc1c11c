//! Error types for attrib.

use thiserror::Error;

/// Result type for attrib operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for attrib operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A core type failed to load or validate.
    #[error(transparent)]
    Core(#[from] attrib_core::Error),

    /// Oracle invocation failed. This aborts the run; every other failure
    /// mode is isolated per document or per frame.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Error::Inference(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
