//! Canonical invoice record and extraction candidate models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel for text fields neither source could produce. Keeps the record
/// schema-stable for downstream consumers.
pub const UNKNOWN: &str = "unknown";

/// Tolerance for treating two amounts as equal.
pub fn amount_epsilon() -> Decimal {
    Decimal::new(1, 2)
}

/// Coarse trust level attached to an extracted field or a whole record.
///
/// Ordered so that `max` picks the stronger level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Parse a confidence label as reported by a provider.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// Which extraction pass produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Rule,
    Ai,
}

/// How the final record was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    RuleOnly,
    AiOnly,
    HybridAiRules,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::RuleOnly => "rule_only",
            ExtractionMethod::AiOnly => "ai_only",
            ExtractionMethod::HybridAiRules => "hybrid_ai_rules",
        }
    }
}

/// Canonical field names of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Vendor,
    Amount,
    Date,
    InvoiceNumber,
    TaxAmount,
    Currency,
    LineItems,
}

impl FieldKey {
    /// Fields that must resolve for a record to be trustworthy.
    pub const REQUIRED: [FieldKey; 4] = [
        FieldKey::Vendor,
        FieldKey::Amount,
        FieldKey::Date,
        FieldKey::InvoiceNumber,
    ];

    /// All seven fields, in record order.
    pub const ALL: [FieldKey; 7] = [
        FieldKey::Vendor,
        FieldKey::Amount,
        FieldKey::Date,
        FieldKey::InvoiceNumber,
        FieldKey::TaxAmount,
        FieldKey::Currency,
        FieldKey::LineItems,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FieldKey::Vendor => "vendor",
            FieldKey::Amount => "amount",
            FieldKey::Date => "date",
            FieldKey::InvoiceNumber => "invoice_number",
            FieldKey::TaxAmount => "tax_amount",
            FieldKey::Currency => "currency",
            FieldKey::LineItems => "line_items",
        }
    }
}

/// A single line item on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description.
    pub description: String,

    /// Item amount.
    pub amount: Decimal,
}

/// Typed value of an extracted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Amount(Decimal),
    Date(NaiveDate),
    Items(Vec<LineItem>),
}

impl FieldValue {
    /// Whether two values agree for merge purposes: case-insensitive for
    /// text, within [`amount_epsilon`] for amounts, exact for dates, and
    /// pairwise description/amount agreement for line items.
    pub fn agrees_with(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => {
                a.trim().eq_ignore_ascii_case(b.trim())
            }
            (FieldValue::Amount(a), FieldValue::Amount(b)) => {
                (*a - *b).abs() <= amount_epsilon()
            }
            (FieldValue::Date(a), FieldValue::Date(b)) => a == b,
            (FieldValue::Items(a), FieldValue::Items(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        x.description.trim().eq_ignore_ascii_case(y.description.trim())
                            && (x.amount - y.amount).abs() <= amount_epsilon()
                    })
            }
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[LineItem]> {
        match self {
            FieldValue::Items(items) => Some(items),
            _ => None,
        }
    }
}

/// One candidate value with provenance. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Extracted value.
    pub value: FieldValue,

    /// Which pass produced it.
    pub source: Source,

    /// Trust level assigned by the producing pass.
    pub confidence: Confidence,

    /// Raw matched text, kept for auditability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ExtractedField {
    pub fn rule(value: FieldValue, confidence: Confidence) -> Self {
        Self {
            value,
            source: Source::Rule,
            confidence,
            raw: None,
        }
    }

    pub fn ai(value: FieldValue, confidence: Confidence) -> Self {
        Self {
            value,
            source: Source::Ai,
            confidence,
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// Candidates from one extraction pass, keyed by field.
///
/// Holds at most one entry per field; a field with no plausible match is
/// simply absent. `BTreeMap` keeps iteration (and serialization) order
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSet {
    fields: BTreeMap<FieldKey, ExtractedField>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, field: ExtractedField) {
        self.fields.insert(key, field);
    }

    pub fn get(&self, key: FieldKey) -> Option<&ExtractedField> {
        self.fields.get(&key)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &ExtractedField)> {
        self.fields.iter()
    }

    /// Required fields with no candidate in this set.
    pub fn missing_required(&self) -> Vec<FieldKey> {
        FieldKey::REQUIRED
            .into_iter()
            .filter(|k| !self.contains(*k))
            .collect()
    }

    /// Whether every required field is present at High confidence.
    pub fn required_all_high(&self) -> bool {
        FieldKey::REQUIRED.into_iter().all(|k| {
            self.get(k)
                .map(|f| f.confidence == Confidence::High)
                .unwrap_or(false)
        })
    }
}

/// Metadata about the extraction that produced a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Document-level OCR confidence the pipeline saw, in [0, 100].
    pub ocr_confidence: f32,

    /// Length of the normalized text fed to the extractors.
    pub text_length: usize,

    /// Wall-clock processing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,

    /// Non-fatal issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The canonical output record. Constructed once per document, immutable
/// after the pipeline hands it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Vendor name, or the "unknown" sentinel.
    pub vendor: String,

    /// Total amount; zero when neither source produced one.
    pub amount: Decimal,

    /// Invoice date as ISO-8601, or the "unknown" sentinel.
    pub date: String,

    /// Invoice number, or the "unknown" sentinel.
    pub invoice_number: String,

    /// Tax amount; zero when absent. Never greater than `amount` when both
    /// are present.
    pub tax_amount: Decimal,

    /// Three-letter currency code; "USD" when undetected.
    pub currency: String,

    /// Line items in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,

    /// Overall confidence of the record.
    pub confidence: Confidence,

    /// How the record was assembled.
    pub extraction_method: ExtractionMethod,

    /// Extraction metadata.
    #[serde(default)]
    pub metadata: RecordMetadata,
}
