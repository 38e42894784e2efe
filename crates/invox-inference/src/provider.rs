//! The provider trait consumed by the extraction pipeline.

use crate::Result;

/// A single completion request with a bounded response size.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The full prompt text. The caller bounds its length.
    pub prompt: String,

    /// Maximum number of tokens the provider may generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
        }
    }
}

/// Trait for generative inference providers.
///
/// Implementations must be safe to share across threads: the pipeline holds
/// the provider behind an `Arc` and documents may be processed in parallel.
/// Implementations must not retry internally; retry policy belongs to the
/// caller.
pub trait InferenceProvider: Send + Sync {
    /// Run one completion and return the raw response text.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
