//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur when invoking an inference provider.
///
/// Callers are expected to treat every variant the same way: the extraction
/// pass that triggered the call degrades to its rule-only result.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The provider did not answer within the configured deadline.
    #[error("inference request timed out")]
    Timeout,

    /// The provider answered with an error, or the transport failed.
    #[error("inference service error: {0}")]
    Service(String),

    /// The provider rejected the request because a usage quota was exhausted.
    #[error("inference quota exceeded")]
    QuotaExceeded,
}
