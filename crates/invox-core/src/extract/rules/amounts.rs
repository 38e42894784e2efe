//! Total and tax amount extraction.

use std::collections::HashMap;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use super::lookup_kv;
use super::patterns::{AMOUNT_BARE, AMOUNT_LABELED, AMOUNT_SYMBOL, TAX_LABELED};
use crate::models::record::{Confidence, ExtractedField, FieldValue};

const AMOUNT_KEYS: [&str; 6] = [
    "grand total",
    "amount due",
    "balance due",
    "total",
    "amount",
    "balance",
];

const TAX_KEYS: [&str; 4] = ["sales tax", "tax", "vat", "gst"];

/// Parse a currency string ("$1,234.56", "€ 99.50", "120.00") to a decimal.
/// The sign survives so callers can reject negatives explicitly.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Extract the total amount. Matcher order: key-value pair, labeled total,
/// largest symbol-prefixed amount, largest bare decimal.
pub fn extract_amount(
    text: &str,
    key_values: &HashMap<String, String>,
) -> Option<ExtractedField> {
    // Tier 1: form fields
    if let Some((key, value)) = lookup_kv(key_values, &AMOUNT_KEYS, &["tax", "date", "items"]) {
        if let Some(amount) = parse_amount(value).filter(is_positive) {
            return Some(
                ExtractedField::rule(FieldValue::Amount(amount), Confidence::High)
                    .with_raw(format!("{key}: {value}")),
            );
        }
    }

    // Tier 1: anchored labels. Totals repeat on real invoices (net, tax,
    // gross); the largest labeled value is the grand total.
    if let Some(field) = largest_match(&AMOUNT_LABELED, text, Confidence::High) {
        return Some(field);
    }

    // Tier 2: symbol-prefixed amounts
    if let Some(field) = largest_match(&AMOUNT_SYMBOL, text, Confidence::Medium) {
        return Some(field);
    }

    // Fallback: bare decimals
    largest_match(&AMOUNT_BARE, text, Confidence::Low)
}

/// Extract the tax amount. Key-value pair → High, anchored label → Medium.
/// Percentages ("Tax Rate: 8.5%") are not amounts and are skipped.
pub fn extract_tax(text: &str, key_values: &HashMap<String, String>) -> Option<ExtractedField> {
    if let Some((key, value)) = lookup_kv(key_values, &TAX_KEYS, &["rate", "id", "%"]) {
        if !value.contains('%') {
            if let Some(tax) = parse_amount(value).filter(|d| !d.is_sign_negative()) {
                return Some(
                    ExtractedField::rule(FieldValue::Amount(tax), Confidence::High)
                        .with_raw(format!("{key}: {value}")),
                );
            }
        }
    }

    for caps in TAX_LABELED.captures_iter(text) {
        let full = caps.get(0).unwrap();
        if text[full.end()..].starts_with('%') {
            continue;
        }
        if let Some(tax) = parse_amount(&caps[1]).filter(|d| !d.is_sign_negative()) {
            return Some(
                ExtractedField::rule(FieldValue::Amount(tax), Confidence::Medium)
                    .with_raw(full.as_str()),
            );
        }
    }

    None
}

fn is_positive(d: &Decimal) -> bool {
    d.is_sign_positive() && !d.is_zero()
}

fn largest_match(re: &Regex, text: &str, confidence: Confidence) -> Option<ExtractedField> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0).unwrap();
            // No lookbehind in the regex crate: a leading minus sign has to
            // be checked here so "-50.00" is rejected, not read as "50.00".
            if text[..full.start()].ends_with('-') {
                return None;
            }
            let amount = parse_amount(&caps[1]).filter(is_positive)?;
            Some((amount, full.as_str().to_string()))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(amount, raw)| {
            ExtractedField::rule(FieldValue::Amount(amount), confidence).with_raw(raw)
        })
}
