//! OCR result input model.
//!
//! The OCR provider is an external collaborator; the caller hands its output
//! to the pipeline in this shape and the core treats it as read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Result of OCR processing on a document, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Full raw text in reading order.
    pub text: String,

    /// Detected key→value pairs (form fields).
    #[serde(default)]
    pub key_values: HashMap<String, String>,

    /// Detected tables: each table is a list of rows of cell text.
    #[serde(default)]
    pub tables: Vec<Vec<Vec<String>>>,

    /// Document-level OCR confidence in [0, 100]. Always present, even if 0.
    pub confidence: f32,
}

impl OcrResult {
    /// Create a result carrying only raw text.
    pub fn from_text(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            key_values: HashMap::new(),
            tables: Vec::new(),
            confidence,
        }
    }

    /// Create an empty result.
    pub fn empty() -> Self {
        Self::from_text(String::new(), 0.0)
    }
}
