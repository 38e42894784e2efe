//! Core library for hybrid invoice field extraction.
//!
//! This crate provides:
//! - Canonical invoice record and candidate models
//! - Deterministic rule-based field extraction (vendor, amounts, dates, ...)
//! - A cost gate deciding whether the generative-AI pass is worth invoking
//! - AI extraction through an injected inference provider, with soft failure
//! - Field-level reconciliation of rule and AI candidates into one record

pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod ocr;

pub use error::{InvoxError, Result};
pub use extract::{AiExtractor, ConfidenceGate, Pipeline, ResultMerger, RuleExtractor};
pub use models::config::PipelineConfig;
pub use models::record::{
    CandidateSet, Confidence, ExtractedField, ExtractionMethod, FieldKey, FieldValue,
    InvoiceRecord, LineItem, Source,
};
pub use normalize::{NormalizedText, TextNormalizer};
pub use ocr::OcrResult;

/// Re-export inference types.
pub use invox_inference::{CompletionRequest, InferenceError, InferenceProvider};
