//! Vendor name extraction.

use std::collections::HashMap;

use super::lookup_kv;
use super::patterns::{COMPANY_SUFFIX, DOCUMENT_HEADER};
use crate::models::record::{Confidence, ExtractedField, FieldValue};

const VENDOR_KEYS: [&str; 6] = [
    "vendor",
    "company",
    "billed by",
    "bill from",
    "seller",
    "from",
];

/// Lines scanned for a company-looking name before giving up on the header
/// heuristics.
const SCAN_LINES: usize = 8;

/// Extract the vendor name. Key-value pair → High, company-suffix line near
/// the top → Medium, first substantial line → Low.
pub fn extract(text: &str, key_values: &HashMap<String, String>) -> Option<ExtractedField> {
    // Tier 1: form fields
    if let Some((key, value)) = lookup_kv(key_values, &VENDOR_KEYS, &["date", "address"]) {
        let value = value.trim();
        if value.len() > 2 {
            return Some(
                ExtractedField::rule(FieldValue::Text(value.to_string()), Confidence::High)
                    .with_raw(format!("{key}: {value}")),
            );
        }
    }

    // Tier 2: a line with a company suffix near the top of the document
    for line in text.lines().take(SCAN_LINES) {
        let line = line.trim();
        if line.len() > 3 && !DOCUMENT_HEADER.is_match(line) && COMPANY_SUFFIX.is_match(line) {
            return Some(
                ExtractedField::rule(FieldValue::Text(line.to_string()), Confidence::Medium)
                    .with_raw(line),
            );
        }
    }

    // Fallback: the first substantial non-header line is usually the
    // letterhead
    text.lines()
        .map(str::trim)
        .find(|line| line.len() > 3 && !DOCUMENT_HEADER.is_match(line))
        .map(|line| {
            ExtractedField::rule(FieldValue::Text(line.to_string()), Confidence::Low)
                .with_raw(line)
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn kv_vendor_is_high() {
        let kv = HashMap::from([("Vendor".to_string(), "Acme Corp".to_string())]);
        let field = extract("irrelevant body", &kv).unwrap();

        assert_eq!(field.value.as_text(), Some("Acme Corp"));
        assert_eq!(field.confidence, Confidence::High);
    }

    #[test]
    fn company_suffix_line_is_medium() {
        let text = "INVOICE\nBeta Logistics LLC\n123 Main St";
        let field = extract(text, &HashMap::new()).unwrap();

        assert_eq!(field.value.as_text(), Some("Beta Logistics LLC"));
        assert_eq!(field.confidence, Confidence::Medium);
    }

    #[test]
    fn first_substantial_line_is_low() {
        let text = "Invoice #42\nNorthwind Traders\nPO Box 99";
        let field = extract(text, &HashMap::new()).unwrap();

        assert_eq!(field.value.as_text(), Some("Northwind Traders"));
        assert_eq!(field.confidence, Confidence::Low);
    }

    #[test]
    fn header_lines_are_never_the_vendor() {
        let text = "INVOICE\nTotal due soon";
        let field = extract(text, &HashMap::new());
        assert!(field.is_none());
    }

    #[test]
    fn short_kv_value_falls_through() {
        let kv = HashMap::from([("Vendor".to_string(), "AB".to_string())]);
        let field = extract("Gamma Industries Inc\nbody", &kv).unwrap();

        assert_eq!(field.value.as_text(), Some("Gamma Industries Inc"));
        assert_eq!(field.confidence, Confidence::Medium);
    }
}
