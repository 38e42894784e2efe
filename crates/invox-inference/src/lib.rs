//! Inference provider abstraction for invox.
//!
//! This crate defines the seam between the extraction core and whatever
//! generative model actually answers prompts:
//! - the [`InferenceProvider`] trait consumed by the pipeline
//! - the three-kind failure taxonomy ([`InferenceError`])
//! - an OpenAI-compatible HTTP chat backend behind the `http` feature

mod error;
mod provider;

#[cfg(feature = "http")]
mod http;

pub use error::InferenceError;
pub use provider::{CompletionRequest, InferenceProvider};

#[cfg(feature = "http")]
pub use http::HttpProvider;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
