//! Reconciliation of rule and AI candidates into one record.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::record::{
    CandidateSet, Confidence, ExtractedField, ExtractionMethod, FieldKey, FieldValue,
    InvoiceRecord, LineItem, RecordMetadata, UNKNOWN,
};

/// How a field was resolved, tracked per required field for the overall
/// confidence computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Only one source produced a value.
    Single,
    /// Both sources produced agreeing values.
    Agreed,
    /// Both sources produced values and one had to win.
    Conflict,
    /// Neither source produced a value; the sentinel was used.
    Absent,
}

/// Outcome of resolving one field.
struct Resolved {
    value: Option<FieldValue>,
    confidence: Confidence,
    resolution: Resolution,
}

/// Merges two candidate sets into the canonical record.
#[derive(Debug, Clone)]
pub struct ResultMerger {
    default_currency: String,
}

impl ResultMerger {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
        }
    }

    /// Reconcile field by field and construct the record. Pure function of
    /// the two sets: the same inputs always produce the identical record.
    pub fn merge(&self, rules: &CandidateSet, ai: &CandidateSet) -> InvoiceRecord {
        let mut warnings = Vec::new();

        let vendor = resolve(rules.get(FieldKey::Vendor), ai.get(FieldKey::Vendor));
        let amount = resolve(rules.get(FieldKey::Amount), ai.get(FieldKey::Amount));
        let date = resolve(rules.get(FieldKey::Date), ai.get(FieldKey::Date));
        let number = resolve(
            rules.get(FieldKey::InvoiceNumber),
            ai.get(FieldKey::InvoiceNumber),
        );
        let tax = resolve(rules.get(FieldKey::TaxAmount), ai.get(FieldKey::TaxAmount));
        let currency = resolve(rules.get(FieldKey::Currency), ai.get(FieldKey::Currency));
        let items = resolve(rules.get(FieldKey::LineItems), ai.get(FieldKey::LineItems));

        let amount_value = amount
            .value
            .as_ref()
            .and_then(FieldValue::as_amount)
            .unwrap_or(Decimal::ZERO);

        let mut tax_value = tax
            .value
            .as_ref()
            .and_then(FieldValue::as_amount)
            .unwrap_or(Decimal::ZERO);

        // An invoice cannot tax more than its total. Inconsistent source
        // data is flagged, never silently accepted.
        if !amount_value.is_zero() && tax_value > amount_value {
            warnings.push(format!(
                "tax_amount {tax_value} exceeds amount {amount_value}; tax dropped"
            ));
            tax_value = Decimal::ZERO;
        }

        let confidence =
            overall_confidence(&[&vendor, &amount, &date, &number]);
        let extraction_method = method(rules, ai);

        debug!(
            ?confidence,
            ?extraction_method,
            "Merged candidates into record"
        );

        InvoiceRecord {
            vendor: text_or_unknown(&vendor),
            amount: amount_value,
            date: date
                .value
                .as_ref()
                .and_then(FieldValue::as_date)
                .map(|d| d.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            invoice_number: text_or_unknown(&number),
            tax_amount: tax_value,
            currency: currency
                .value
                .as_ref()
                .and_then(FieldValue::as_text)
                .map(str::to_string)
                .unwrap_or_else(|| self.default_currency.clone()),
            line_items: items
                .value
                .as_ref()
                .and_then(FieldValue::as_items)
                .map(<[LineItem]>::to_vec)
                .unwrap_or_default(),
            confidence,
            extraction_method,
            metadata: RecordMetadata {
                warnings,
                ..Default::default()
            },
        }
    }
}

/// Per-field reconciliation:
/// 1. one source → use it;
/// 2. agreement → either value at the higher confidence;
/// 3. disagreement → AI wins, unless rule is High and AI is Low;
/// 4. neither → absent, the caller substitutes the sentinel.
fn resolve(rule: Option<&ExtractedField>, ai: Option<&ExtractedField>) -> Resolved {
    match (rule, ai) {
        (None, None) => Resolved {
            value: None,
            confidence: Confidence::Low,
            resolution: Resolution::Absent,
        },
        (Some(single), None) | (None, Some(single)) => Resolved {
            value: Some(single.value.clone()),
            confidence: single.confidence,
            resolution: Resolution::Single,
        },
        (Some(rule), Some(ai)) if rule.value.agrees_with(&ai.value) => Resolved {
            value: Some(rule.value.clone()),
            confidence: rule.confidence.max(ai.confidence),
            resolution: Resolution::Agreed,
        },
        (Some(rule), Some(ai)) => {
            let winner = if rule.confidence == Confidence::High && ai.confidence == Confidence::Low
            {
                rule
            } else {
                ai
            };
            Resolved {
                value: Some(winner.value.clone()),
                confidence: winner.confidence,
                resolution: Resolution::Conflict,
            }
        }
    }
}

/// High only when every required field resolved cleanly (one source or
/// agreement) at High; Low when any required field fell to the sentinel;
/// Medium otherwise.
fn overall_confidence(required: &[&Resolved]) -> Confidence {
    if required
        .iter()
        .any(|r| r.resolution == Resolution::Absent)
    {
        return Confidence::Low;
    }

    let all_high = required.iter().all(|r| {
        matches!(r.resolution, Resolution::Single | Resolution::Agreed)
            && r.confidence == Confidence::High
    });

    if all_high {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

fn method(rules: &CandidateSet, ai: &CandidateSet) -> ExtractionMethod {
    if ai.is_empty() {
        ExtractionMethod::RuleOnly
    } else if rules.is_empty() {
        ExtractionMethod::AiOnly
    } else {
        ExtractionMethod::HybridAiRules
    }
}

fn text_or_unknown(resolved: &Resolved) -> String {
    resolved
        .value
        .as_ref()
        .and_then(FieldValue::as_text)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn merger() -> ResultMerger {
        ResultMerger::new("USD")
    }

    fn rule_text(key: FieldKey, value: &str, confidence: Confidence) -> (FieldKey, ExtractedField) {
        (
            key,
            ExtractedField::rule(FieldValue::Text(value.to_string()), confidence),
        )
    }

    fn ai_text(key: FieldKey, value: &str, confidence: Confidence) -> (FieldKey, ExtractedField) {
        (
            key,
            ExtractedField::ai(FieldValue::Text(value.to_string()), confidence),
        )
    }

    fn set_of(entries: Vec<(FieldKey, ExtractedField)>) -> CandidateSet {
        let mut set = CandidateSet::new();
        for (key, field) in entries {
            set.insert(key, field);
        }
        set
    }

    fn full_rule_set(confidence: Confidence) -> CandidateSet {
        let mut set = CandidateSet::new();
        set.insert(
            FieldKey::Vendor,
            ExtractedField::rule(FieldValue::Text("Acme Corp".to_string()), confidence),
        );
        set.insert(
            FieldKey::Amount,
            ExtractedField::rule(FieldValue::Amount(dec("120.00")), confidence),
        );
        set.insert(
            FieldKey::Date,
            ExtractedField::rule(
                FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
                confidence,
            ),
        );
        set.insert(
            FieldKey::InvoiceNumber,
            ExtractedField::rule(FieldValue::Text("INV-01".to_string()), confidence),
        );
        set
    }

    #[test]
    fn single_source_is_used_directly() {
        let record = merger().merge(&full_rule_set(Confidence::High), &CandidateSet::new());

        assert_eq!(record.vendor, "Acme Corp");
        assert_eq!(record.amount, dec("120.00"));
        assert_eq!(record.date, "2024-03-15");
        assert_eq!(record.invoice_number, "INV-01");
        assert_eq!(record.confidence, Confidence::High);
        assert_eq!(record.extraction_method, ExtractionMethod::RuleOnly);
    }

    #[test]
    fn empty_sets_produce_sentinels_at_low() {
        let record = merger().merge(&CandidateSet::new(), &CandidateSet::new());

        assert_eq!(record.vendor, UNKNOWN);
        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.date, UNKNOWN);
        assert_eq!(record.invoice_number, UNKNOWN);
        assert_eq!(record.tax_amount, Decimal::ZERO);
        assert_eq!(record.currency, "USD");
        assert!(record.line_items.is_empty());
        assert_eq!(record.confidence, Confidence::Low);
    }

    #[test]
    fn agreement_takes_higher_confidence() {
        let rules = set_of(vec![rule_text(
            FieldKey::Vendor,
            "acme corp",
            Confidence::Medium,
        )]);
        let ai = set_of(vec![ai_text(FieldKey::Vendor, "ACME CORP", Confidence::High)]);

        let record = merger().merge(&rules, &ai);

        // Case-insensitive agreement; the rule's spelling is kept
        assert_eq!(record.vendor, "acme corp");
        assert_eq!(record.extraction_method, ExtractionMethod::HybridAiRules);
    }

    #[test]
    fn disagreement_prefers_ai() {
        let rules = set_of(vec![rule_text(
            FieldKey::Vendor,
            "Acme Corp",
            Confidence::Medium,
        )]);
        let ai = set_of(vec![ai_text(
            FieldKey::Vendor,
            "Acme Corporation",
            Confidence::Medium,
        )]);

        let record = merger().merge(&rules, &ai);
        assert_eq!(record.vendor, "Acme Corporation");
    }

    #[test]
    fn high_rule_beats_low_ai() {
        let rules = set_of(vec![rule_text(
            FieldKey::Vendor,
            "Acme Corp",
            Confidence::High,
        )]);
        let ai = set_of(vec![ai_text(FieldKey::Vendor, "Ace Corp", Confidence::Low)]);

        let record = merger().merge(&rules, &ai);
        assert_eq!(record.vendor, "Acme Corp");
    }

    #[test]
    fn high_ai_beats_high_rule_on_disagreement() {
        let rules = set_of(vec![rule_text(
            FieldKey::Vendor,
            "Acme Corp",
            Confidence::High,
        )]);
        let ai = set_of(vec![ai_text(FieldKey::Vendor, "Ace Corp", Confidence::High)]);

        let record = merger().merge(&rules, &ai);
        assert_eq!(record.vendor, "Ace Corp");
    }

    #[test]
    fn conflict_excludes_high_overall_confidence() {
        let mut rules = full_rule_set(Confidence::High);
        rules.insert(
            FieldKey::Vendor,
            ExtractedField::rule(FieldValue::Text("Acme Corp".to_string()), Confidence::High),
        );
        let ai = set_of(vec![ai_text(
            FieldKey::Vendor,
            "Someone Else",
            Confidence::High,
        )]);

        let record = merger().merge(&rules, &ai);
        assert_eq!(record.confidence, Confidence::Medium);
    }

    #[test]
    fn tax_greater_than_amount_is_flagged_and_dropped() {
        let mut rules = full_rule_set(Confidence::High);
        rules.insert(
            FieldKey::TaxAmount,
            ExtractedField::rule(FieldValue::Amount(dec("500.00")), Confidence::High),
        );

        let record = merger().merge(&rules, &CandidateSet::new());

        assert_eq!(record.tax_amount, Decimal::ZERO);
        assert_eq!(record.metadata.warnings.len(), 1);
        assert!(record.metadata.warnings[0].contains("exceeds"));
    }

    #[test]
    fn plausible_tax_is_kept() {
        let mut rules = full_rule_set(Confidence::High);
        rules.insert(
            FieldKey::TaxAmount,
            ExtractedField::rule(FieldValue::Amount(dec("20.00")), Confidence::Medium),
        );

        let record = merger().merge(&rules, &CandidateSet::new());
        assert_eq!(record.tax_amount, dec("20.00"));
        assert!(record.metadata.warnings.is_empty());
    }

    #[test]
    fn ai_only_method_when_rules_empty() {
        let ai = set_of(vec![ai_text(FieldKey::Vendor, "Beta LLC", Confidence::Medium)]);
        let record = merger().merge(&CandidateSet::new(), &ai);

        assert_eq!(record.extraction_method, ExtractionMethod::AiOnly);
        assert_eq!(record.vendor, "Beta LLC");
    }

    #[test]
    fn merge_is_idempotent() {
        let rules = full_rule_set(Confidence::Medium);
        let ai = set_of(vec![ai_text(FieldKey::Vendor, "Beta LLC", Confidence::High)]);

        let merger = merger();
        let first = serde_json::to_string(&merger.merge(&rules, &ai)).unwrap();
        let second = serde_json::to_string(&merger.merge(&rules, &ai)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_required_field_lowers_confidence() {
        let rules = set_of(vec![rule_text(
            FieldKey::Vendor,
            "Acme Corp",
            Confidence::High,
        )]);

        let record = merger().merge(&rules, &CandidateSet::new());
        assert_eq!(record.confidence, Confidence::Low);
    }

    #[test]
    fn medium_fields_yield_medium_overall() {
        let record = merger().merge(&full_rule_set(Confidence::Medium), &CandidateSet::new());
        assert_eq!(record.confidence, Confidence::Medium);
    }
}
