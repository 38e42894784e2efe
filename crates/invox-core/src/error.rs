//! Error types for the invox-core library.
//!
//! The extraction pipeline itself has no fatal path: given a valid
//! [`crate::OcrResult`] it always produces a record, degrading confidence
//! instead of failing. The variants here cover the plumbing around it.

use thiserror::Error;

/// Main error type for the invox library.
#[derive(Error, Debug)]
pub enum InvoxError {
    /// Inference error from the provider layer.
    #[error("inference error: {0}")]
    Inference(#[from] invox_inference::InferenceError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the invox library.
pub type Result<T> = std::result::Result<T, InvoxError>;
