//! Pipeline orchestrating the extraction passes.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use invox_inference::InferenceProvider;

use super::ai::AiExtractor;
use super::gate::ConfidenceGate;
use super::merge::ResultMerger;
use super::rules::RuleExtractor;
use crate::models::config::PipelineConfig;
use crate::models::record::{CandidateSet, InvoiceRecord};
use crate::normalize::TextNormalizer;
use crate::ocr::OcrResult;

/// Per-document extraction pipeline: normalize → rules → gate → (AI) →
/// merge.
///
/// Stateless across invocations; a single pipeline may serve concurrent
/// documents from multiple threads. The only outward call is the conditional
/// provider invocation, and any failure there degrades the record's
/// confidence instead of surfacing — there is no fatal path once a valid
/// [`OcrResult`] is supplied.
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: TextNormalizer,
    rules: RuleExtractor,
    gate: ConfidenceGate,
    merger: ResultMerger,
    ai: Option<AiExtractor>,
}

impl Pipeline {
    /// Build a rule-only pipeline from explicit configuration.
    pub fn new(config: PipelineConfig) -> Self {
        let normalizer = TextNormalizer::new(config.max_text_chars);
        let rules = RuleExtractor::new().with_max_line_items(config.max_line_items);
        let gate = ConfidenceGate::new(config.ocr_quality_threshold);
        let merger = ResultMerger::new(config.default_currency.clone());

        Self {
            config,
            normalizer,
            rules,
            gate,
            merger,
            ai: None,
        }
    }

    /// Attach an inference provider, enabling the gated AI pass.
    pub fn with_provider(mut self, provider: Arc<dyn InferenceProvider>) -> Self {
        self.ai = Some(AiExtractor::new(provider, self.config.max_response_tokens));
        self
    }

    /// Process one document. Always returns a complete record; vendor and
    /// amount are populated with real values or explicit sentinels.
    pub fn run(&self, ocr: &OcrResult) -> InvoiceRecord {
        let start = Instant::now();

        let text = self.normalizer.normalize(ocr);
        if text.truncated {
            debug!(
                max_chars = self.config.max_text_chars,
                "Normalized text truncated to budget"
            );
        }

        let rule_candidates = self.rules.extract(&text, ocr);
        info!(
            fields = rule_candidates.len(),
            ocr_confidence = ocr.confidence,
            "Rule extraction complete"
        );

        let ai_candidates = match &self.ai {
            Some(extractor) if self.gate.should_invoke_ai(ocr, &rule_candidates) => {
                extractor.extract(&text)
            }
            _ => CandidateSet::new(),
        };

        let mut record = self.merger.merge(&rule_candidates, &ai_candidates);
        record.metadata.ocr_confidence = ocr.confidence;
        record.metadata.text_length = text.len();
        record.metadata.processing_time_ms = Some(start.elapsed().as_millis() as u64);

        info!(
            vendor = %record.vendor,
            confidence = ?record.confidence,
            method = ?record.extraction_method,
            "Extraction complete"
        );

        record
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use invox_inference::{CompletionRequest, InferenceError, InferenceProvider};

    use super::*;
    use crate::models::record::{Confidence, ExtractionMethod};

    /// Provider returning a canned response and counting invocations.
    struct CountingProvider {
        response: String,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InferenceProvider for CountingProvider {
        fn complete(&self, _request: &CompletionRequest) -> invox_inference::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct TimeoutProvider;

    impl InferenceProvider for TimeoutProvider {
        fn complete(&self, _request: &CompletionRequest) -> invox_inference::Result<String> {
            Err(InferenceError::Timeout)
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn high_quality_ocr() -> OcrResult {
        let mut ocr = OcrResult::from_text(
            "Acme Corp\nInvoice #INV-01\nDate: 2024-03-15\nTotal: $120.00\n",
            95.0,
        );
        ocr.key_values
            .insert("Vendor".to_string(), "Acme Corp".to_string());
        ocr.key_values
            .insert("Invoice Number".to_string(), "INV-01".to_string());
        ocr.key_values
            .insert("Invoice Date".to_string(), "2024-03-15".to_string());
        ocr.key_values
            .insert("Grand Total".to_string(), "$120.00".to_string());
        ocr
    }

    #[test]
    fn always_returns_schema_stable_record() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let record = pipeline.run(&OcrResult::empty());

        assert!(!record.vendor.is_empty());
        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.confidence, Confidence::Low);
    }

    #[test]
    fn high_quality_complete_rules_skip_ai() {
        let provider = Arc::new(CountingProvider::new(r#"{"vendor": "Wrong Inc"}"#));
        let pipeline =
            Pipeline::new(PipelineConfig::default()).with_provider(provider.clone());

        let record = pipeline.run(&high_quality_ocr());

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(record.extraction_method, ExtractionMethod::RuleOnly);
        assert_eq!(record.confidence, Confidence::High);
        assert_eq!(record.vendor, "Acme Corp");
        assert_eq!(record.amount, dec("120.00"));
        assert_eq!(record.date, "2024-03-15");
        assert_eq!(record.invoice_number, "INV-01");
    }

    #[test]
    fn low_quality_ocr_triggers_hybrid_merge() {
        // Rules will only find a Medium-confidence bare amount
        let ocr = OcrResult::from_text("smudged scan mentions 75.00 only", 40.0);

        let provider = Arc::new(CountingProvider::new(
            r#"{"vendor": "Beta LLC", "date": "2024-01-02",
                "invoice_number": "B-99", "amount": 75.00}"#,
        ));
        let pipeline =
            Pipeline::new(PipelineConfig::default()).with_provider(provider.clone());

        let record = pipeline.run(&ocr);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(record.extraction_method, ExtractionMethod::HybridAiRules);
        assert_eq!(record.vendor, "Beta LLC");
        assert_eq!(record.date, "2024-01-02");
        assert_eq!(record.invoice_number, "B-99");
        assert_eq!(record.amount, dec("75.00"));
    }

    #[test]
    fn provider_timeout_degrades_to_rule_only() {
        let ocr = high_quality_ocr();
        // Force the gate open with a low OCR score
        let ocr = OcrResult {
            confidence: 30.0,
            ..ocr
        };

        let pipeline =
            Pipeline::new(PipelineConfig::default()).with_provider(Arc::new(TimeoutProvider));

        let record = pipeline.run(&ocr);

        assert_eq!(record.extraction_method, ExtractionMethod::RuleOnly);
        assert_eq!(record.vendor, "Acme Corp");
        assert_eq!(record.amount, dec("120.00"));
    }

    #[test]
    fn without_provider_extraction_is_rule_only() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let record = pipeline.run(&OcrResult::from_text("garbled 40.00 text", 10.0));

        assert_eq!(record.extraction_method, ExtractionMethod::RuleOnly);
    }

    #[test]
    fn metadata_is_stamped() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let record = pipeline.run(&high_quality_ocr());

        assert_eq!(record.metadata.ocr_confidence, 95.0);
        assert!(record.metadata.text_length > 0);
        assert!(record.metadata.processing_time_ms.is_some());
    }
}
