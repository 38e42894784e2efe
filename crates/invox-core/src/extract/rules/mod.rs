//! Deterministic rule-based field extractors.
//!
//! Each field module carries an ordered list of matchers, most anchored
//! first; the first matcher yielding a plausible value wins and fixes the
//! candidate's confidence (key-value pair or anchored label → High, generic
//! pattern → Medium, fallback heuristic → Low).

pub mod amounts;
pub mod currency;
pub mod dates;
pub mod items;
pub mod patterns;
pub mod reference;
pub mod vendor;

use std::collections::HashMap;

use tracing::debug;

use crate::models::record::{CandidateSet, FieldKey};
use crate::normalize::NormalizedText;
use crate::ocr::OcrResult;

/// Look up the first key-value pair whose key contains one of the wanted
/// labels (checked in order, case-insensitive). Keys carrying `skip` are
/// ignored, so a "date" label never satisfies an "invoice" lookup.
pub(crate) fn lookup_kv<'a>(
    key_values: &'a HashMap<String, String>,
    wanted: &[&str],
    skip: &[&str],
) -> Option<(&'a str, &'a str)> {
    for label in wanted {
        let found = key_values.iter().find(|(k, v)| {
            let k = k.to_lowercase();
            k.contains(label) && !skip.iter().any(|s| k.contains(s)) && !v.trim().is_empty()
        });
        if let Some((k, v)) = found {
            return Some((k.as_str(), v.as_str()));
        }
    }
    None
}

/// Deterministic pattern-based extractor. Same input, same output; no
/// randomness, no external calls.
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    max_line_items: usize,
}

impl RuleExtractor {
    pub fn new() -> Self {
        Self { max_line_items: 10 }
    }

    pub fn with_max_line_items(mut self, max_line_items: usize) -> Self {
        self.max_line_items = max_line_items;
        self
    }

    /// Extract rule-sourced candidates from normalized text plus the OCR
    /// collaborator's key-value pairs and tables. Fields with no plausible
    /// match are omitted.
    pub fn extract(&self, text: &NormalizedText, ocr: &OcrResult) -> CandidateSet {
        let body = text.text.as_str();
        let kv = &ocr.key_values;
        let mut set = CandidateSet::new();

        if let Some(field) = vendor::extract(body, kv) {
            set.insert(FieldKey::Vendor, field);
        }
        if let Some(field) = amounts::extract_amount(body, kv) {
            set.insert(FieldKey::Amount, field);
        }
        if let Some(field) = dates::extract(body, kv) {
            set.insert(FieldKey::Date, field);
        }
        if let Some(field) = reference::extract(body, kv) {
            set.insert(FieldKey::InvoiceNumber, field);
        }
        if let Some(field) = amounts::extract_tax(body, kv) {
            set.insert(FieldKey::TaxAmount, field);
        }
        if let Some(field) = currency::extract(body) {
            set.insert(FieldKey::Currency, field);
        }
        if let Some(field) = items::extract(body, &ocr.tables, self.max_line_items) {
            set.insert(FieldKey::LineItems, field);
        }

        debug!(fields = set.len(), "Rule extraction produced candidates");
        set
    }
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new()
    }
}
