//! Configuration for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{InvoxError, Result};

/// Pipeline configuration with named thresholds.
///
/// Passed explicitly into [`crate::Pipeline`] construction; the core reads no
/// ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// OCR confidence (0-100) at or above which the document counts as
    /// high quality for gating purposes.
    pub ocr_quality_threshold: f32,

    /// Maximum characters of normalized text kept for downstream consumers.
    /// Bounds AI prompt cost.
    pub max_text_chars: usize,

    /// Response-size cap handed to the inference provider.
    pub max_response_tokens: u32,

    /// Deadline for a single provider call.
    pub ai_timeout_secs: u64,

    /// Currency code used when neither source detects one.
    pub default_currency: String,

    /// Maximum number of line items kept per document.
    pub max_line_items: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ocr_quality_threshold: 90.0,
            max_text_chars: 4000,
            max_response_tokens: 500,
            ai_timeout_secs: 30,
            default_currency: "USD".to_string(),
            max_line_items: 10,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check threshold ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.ocr_quality_threshold) {
            return Err(InvoxError::Config(format!(
                "ocr_quality_threshold must be in [0, 100], got {}",
                self.ocr_quality_threshold
            )));
        }
        if self.max_text_chars == 0 {
            return Err(InvoxError::Config(
                "max_text_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
