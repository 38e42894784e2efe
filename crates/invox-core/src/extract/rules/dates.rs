//! Invoice date extraction.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::lookup_kv;
use super::patterns::{DATE_DAY_FIRST, DATE_LABELED, DATE_MONTH_FIRST, DATE_NUMERIC};
use crate::models::record::{Confidence, ExtractedField, FieldValue};

const DATE_KEYS: [&str; 7] = [
    "invoice date",
    "bill date",
    "issue date",
    "date issued",
    "issued",
    "date",
    "created",
];

/// The accepted date grammar, tried in order. Month-first numeric forms come
/// before day-first, so "03/04/2024" reads as March 4th.
const FORMATS: [&str; 14] = [
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%y",
    "%d/%m/%y",
];

/// Parse a date string against the known grammar, normalizing to a calendar
/// date (rendered ISO-8601 downstream).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim().trim_end_matches('.');
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Find the first parseable date anywhere in the text.
fn find_any(text: &str) -> Option<(NaiveDate, &str)> {
    for re in [&*DATE_NUMERIC, &*DATE_MONTH_FIRST, &*DATE_DAY_FIRST] {
        for m in re.find_iter(text) {
            if let Some(date) = parse_date(m.as_str()) {
                return Some((date, m.as_str()));
            }
        }
    }
    None
}

/// Extract the invoice date. Key-value pair or anchored label → High, any
/// recognizable date in the body → Medium.
pub fn extract(text: &str, key_values: &HashMap<String, String>) -> Option<ExtractedField> {
    // Tier 1: form fields. Due/order dates are different fields.
    if let Some((key, value)) = lookup_kv(key_values, &DATE_KEYS, &["due", "order", "ship"]) {
        let parsed = parse_date(value).or_else(|| find_any(value).map(|(d, _)| d));
        if let Some(date) = parsed {
            return Some(
                ExtractedField::rule(FieldValue::Date(date), Confidence::High)
                    .with_raw(format!("{key}: {value}")),
            );
        }
    }

    // Tier 1: anchored labels in the body
    for caps in DATE_LABELED.captures_iter(text) {
        let full = caps.get(0).unwrap();
        if preceded_by_due(text, full.start()) {
            continue;
        }
        let captured = caps[1].trim();
        let parsed = parse_date(captured).or_else(|| find_any(captured).map(|(d, _)| d));
        if let Some(date) = parsed {
            return Some(
                ExtractedField::rule(FieldValue::Date(date), Confidence::High)
                    .with_raw(full.as_str().trim()),
            );
        }
    }

    // Tier 2: first parseable date anywhere
    find_any(text).map(|(date, raw)| {
        ExtractedField::rule(FieldValue::Date(date), Confidence::Medium).with_raw(raw)
    })
}

/// "Due date:"/"due:" labels mark the payment deadline, not the issue date.
fn preceded_by_due(text: &str, start: usize) -> bool {
    text[..start]
        .trim_end()
        .to_lowercase()
        .ends_with("due")
}
