//! AI extraction pass.
//!
//! Builds one fixed-schema prompt over the normalized text, invokes the
//! injected inference provider, and parses its answer defensively. Every
//! failure mode — provider error, timeout, malformed or empty response —
//! degrades to an empty candidate set; the pipeline continues on rules alone.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, warn};

use invox_inference::{CompletionRequest, InferenceProvider};

use super::rules::{amounts, currency, dates};
use crate::models::record::{
    CandidateSet, Confidence, ExtractedField, FieldKey, FieldValue, LineItem,
};
use crate::normalize::NormalizedText;

const PROMPT_HEADER: &str = r#"Extract invoice information from this text and return ONLY valid JSON:

{
    "vendor": "company name that issued the invoice",
    "amount": 0.00,
    "date": "YYYY-MM-DD",
    "invoice_number": "invoice number",
    "tax_amount": 0.00,
    "currency": "USD",
    "line_items": [
        {"description": "item description", "amount": 0.00}
    ],
    "confidence": "low, medium or high"
}

Use null for fields you cannot determine. Return only the JSON object, no markdown fences, no commentary.

Text: "#;

/// A number that may arrive as a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numberish {
    Num(f64),
    Text(String),
}

impl Numberish {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Numberish::Num(n) => Decimal::from_f64(*n),
            Numberish::Text(s) => amounts::parse_amount(s),
        }
    }
}

/// The response schema the prompt asks for. Unknown keys are tolerated.
#[derive(Debug, Deserialize)]
struct AiPayload {
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    amount: Option<Numberish>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    invoice_number: Option<String>,
    #[serde(default)]
    tax_amount: Option<Numberish>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    line_items: Option<Vec<AiLineItem>>,
    #[serde(default)]
    confidence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiLineItem {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    amount: Option<Numberish>,
}

/// Extractor delegating to a generative inference provider. Fails softly.
pub struct AiExtractor {
    provider: Arc<dyn InferenceProvider>,
    max_response_tokens: u32,
}

impl AiExtractor {
    pub fn new(provider: Arc<dyn InferenceProvider>, max_response_tokens: u32) -> Self {
        Self {
            provider,
            max_response_tokens,
        }
    }

    /// Run the AI pass over the (already bounded) normalized text. Returns
    /// an empty set on any provider or parse failure.
    pub fn extract(&self, text: &NormalizedText) -> CandidateSet {
        let request = CompletionRequest::new(build_prompt(&text.text), self.max_response_tokens);

        let response = match self.provider.complete(&request) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "AI extraction failed, continuing with rule candidates");
                return CandidateSet::new();
            }
        };

        match parse_response(&response) {
            Some(set) => {
                debug!(fields = set.len(), "AI extraction produced candidates");
                set
            }
            None => {
                warn!("AI response was not parseable JSON, ignoring");
                CandidateSet::new()
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!("{PROMPT_HEADER}{text}")
}

/// Parse the raw completion into candidates, or None if no JSON object could
/// be recovered.
fn parse_response(response: &str) -> Option<CandidateSet> {
    let stripped = strip_fences(response);
    let json = extract_json_object(stripped)?;
    let payload: AiPayload = serde_json::from_str(json).ok()?;
    Some(candidates_from(payload))
}

/// Strip markdown fences the model may add despite instructions.
fn strip_fences(s: &str) -> &str {
    s.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Slice out the outermost JSON object; models sometimes prepend or append
/// commentary.
fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

/// Apply the shared plausibility checks and build ai-sourced candidates.
/// Values failing a check are dropped, not corrected.
fn candidates_from(payload: AiPayload) -> CandidateSet {
    let confidence = payload
        .confidence
        .as_deref()
        .and_then(Confidence::from_label)
        .unwrap_or(Confidence::Medium);

    let mut set = CandidateSet::new();

    if let Some(vendor) = payload.vendor.as_deref().map(str::trim) {
        if vendor.len() > 1 {
            set.insert(
                FieldKey::Vendor,
                ExtractedField::ai(FieldValue::Text(vendor.to_string()), confidence),
            );
        }
    }

    if let Some(amount) = payload.amount.as_ref().and_then(Numberish::to_decimal) {
        if amount.is_sign_positive() && !amount.is_zero() {
            set.insert(
                FieldKey::Amount,
                ExtractedField::ai(FieldValue::Amount(amount), confidence),
            );
        } else {
            debug!(%amount, "Dropping implausible AI amount");
        }
    }

    if let Some(raw) = payload.date.as_deref() {
        match dates::parse_date(raw) {
            Some(date) => set.insert(
                FieldKey::Date,
                ExtractedField::ai(FieldValue::Date(date), confidence),
            ),
            None => debug!(raw, "Dropping unparseable AI date"),
        }
    }

    if let Some(number) = payload.invoice_number.as_deref().map(str::trim) {
        if number.len() > 1 {
            set.insert(
                FieldKey::InvoiceNumber,
                ExtractedField::ai(FieldValue::Text(number.to_string()), confidence),
            );
        }
    }

    if let Some(tax) = payload.tax_amount.as_ref().and_then(Numberish::to_decimal) {
        if !tax.is_sign_negative() {
            set.insert(
                FieldKey::TaxAmount,
                ExtractedField::ai(FieldValue::Amount(tax), confidence),
            );
        } else {
            debug!(%tax, "Dropping negative AI tax amount");
        }
    }

    if let Some(code) = payload.currency.as_deref().map(str::trim) {
        if currency::is_known_code(code) {
            set.insert(
                FieldKey::Currency,
                ExtractedField::ai(FieldValue::Text(code.to_uppercase()), confidence),
            );
        } else if !code.is_empty() {
            debug!(code, "Dropping unrecognized AI currency code");
        }
    }

    if let Some(raw_items) = payload.line_items {
        let items: Vec<LineItem> = raw_items
            .into_iter()
            .filter_map(|item| {
                let description = item.description?.trim().to_string();
                let amount = item.amount?.to_decimal()?;
                (description.len() > 1 && amount.is_sign_positive() && !amount.is_zero())
                    .then_some(LineItem {
                        description,
                        amount,
                    })
            })
            .collect();

        if !items.is_empty() {
            set.insert(
                FieldKey::LineItems,
                ExtractedField::ai(FieldValue::Items(items), confidence),
            );
        }
    }

    set
}
