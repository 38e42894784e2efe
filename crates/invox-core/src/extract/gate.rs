//! Cost gate for the AI extraction pass.

use tracing::debug;

use crate::models::record::CandidateSet;
use crate::ocr::OcrResult;

/// Decides whether the AI pass is worth its cost.
///
/// The AI call is conditional, not unconditional: a high-quality scan whose
/// required fields all came out of the rules at High confidence has nothing
/// left for the model to add.
#[derive(Debug, Clone)]
pub struct ConfidenceGate {
    ocr_quality_threshold: f32,
}

impl ConfidenceGate {
    pub fn new(ocr_quality_threshold: f32) -> Self {
        Self {
            ocr_quality_threshold,
        }
    }

    /// Invoke the AI pass when OCR quality is below the threshold, or when
    /// any required field is missing from the rule candidates or present at
    /// less than High confidence.
    pub fn should_invoke_ai(&self, ocr: &OcrResult, rule_candidates: &CandidateSet) -> bool {
        if ocr.confidence < self.ocr_quality_threshold {
            debug!(
                confidence = ocr.confidence,
                threshold = self.ocr_quality_threshold,
                "OCR quality below threshold, invoking AI pass"
            );
            return true;
        }

        if !rule_candidates.required_all_high() {
            debug!(
                missing = ?rule_candidates.missing_required(),
                "Required fields incomplete after rules, invoking AI pass"
            );
            return true;
        }

        debug!("Rules complete and OCR quality high, skipping AI pass");
        false
    }
}
