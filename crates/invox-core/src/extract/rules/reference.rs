//! Invoice number extraction.

use std::collections::HashMap;

use regex::Regex;

use super::dates;
use super::lookup_kv;
use super::patterns::{HASH_NUMBER, INVOICE_NUMBER, INVOICE_NUMBER_WORDED, INV_SHORT, REF_LABELED};
use crate::models::record::{Confidence, ExtractedField, FieldValue};

const NUMBER_KEYS: [&str; 6] = [
    "invoice number",
    "invoice no",
    "invoice #",
    "invoice",
    "reference",
    "ref",
];

/// Shortest string accepted as an invoice number.
const MIN_LEN: usize = 3;

/// Extract the invoice number. Key-value pair or "invoice #"-anchored
/// pattern → High, "inv"/"ref" shorthand → Medium, a bare "#XYZ" → Low.
pub fn extract(text: &str, key_values: &HashMap<String, String>) -> Option<ExtractedField> {
    // Tier 1: form fields
    if let Some((key, value)) = lookup_kv(key_values, &NUMBER_KEYS, &["date", "total", "amount"]) {
        let cleaned = clean_value(value);
        // A date sitting under an "Invoice" key is not a number
        if cleaned.len() >= MIN_LEN && dates::parse_date(value).is_none() {
            return Some(
                ExtractedField::rule(FieldValue::Text(cleaned), Confidence::High)
                    .with_raw(format!("{key}: {value}")),
            );
        }
    }

    // Tier 1: anchored body patterns
    for re in [&*INVOICE_NUMBER, &*INVOICE_NUMBER_WORDED] {
        if let Some(field) = first_capture(re, text, Confidence::High) {
            return Some(field);
        }
    }

    // Tier 2: shorthand labels
    for re in [&*INV_SHORT, &*REF_LABELED] {
        if let Some(field) = first_capture(re, text, Confidence::Medium) {
            return Some(field);
        }
    }

    // Fallback: any hash-marked token
    first_capture(&HASH_NUMBER, text, Confidence::Low)
}

fn first_capture(re: &Regex, text: &str, confidence: Confidence) -> Option<ExtractedField> {
    re.captures_iter(text).find_map(|caps| {
        let value = caps[1].to_string();
        if value.len() < MIN_LEN || dates::parse_date(&value).is_some() {
            return None;
        }
        Some(
            ExtractedField::rule(FieldValue::Text(value), confidence)
                .with_raw(caps.get(0).unwrap().as_str()),
        )
    })
}

fn clean_value(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn anchored_invoice_number_is_high() {
        let field = extract("Invoice #INV-001 for services", &HashMap::new()).unwrap();
        assert_eq!(field.value.as_text(), Some("INV-001"));
        assert_eq!(field.confidence, Confidence::High);
    }

    #[test]
    fn worded_form_is_high() {
        let field = extract("Invoice Number B-99", &HashMap::new()).unwrap();
        assert_eq!(field.value.as_text(), Some("B-99"));
        assert_eq!(field.confidence, Confidence::High);
    }

    #[test]
    fn shorthand_is_medium() {
        let field = extract("ref: PO-778", &HashMap::new()).unwrap();
        assert_eq!(field.value.as_text(), Some("PO-778"));
        assert_eq!(field.confidence, Confidence::Medium);
    }

    #[test]
    fn bare_hash_is_low() {
        let field = extract("order #A12345 shipped", &HashMap::new()).unwrap();
        assert_eq!(field.value.as_text(), Some("A12345"));
        assert_eq!(field.confidence, Confidence::Low);
    }

    #[test]
    fn kv_value_is_cleaned() {
        let kv = HashMap::from([("Invoice No.".to_string(), " INV 001 ".to_string())]);
        let field = extract("", &kv).unwrap();

        assert_eq!(field.value.as_text(), Some("INV001"));
        assert_eq!(field.confidence, Confidence::High);
    }

    #[test]
    fn date_under_invoice_key_is_rejected() {
        let kv = HashMap::from([("Invoice".to_string(), "2024-01-15".to_string())]);
        assert!(extract("", &kv).is_none());
    }

    #[test]
    fn too_short_values_are_rejected() {
        assert!(extract("Invoice #: AB", &HashMap::new()).is_none());
    }
}
