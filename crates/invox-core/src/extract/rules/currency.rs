//! Currency code detection.

use super::patterns::CURRENCY_CODE;
use crate::models::record::{Confidence, ExtractedField, FieldValue};

/// Currency codes the extractors will emit. Anything else is dropped and the
/// merge step falls back to the configured default.
pub const KNOWN_CODES: [&str; 6] = ["USD", "EUR", "GBP", "JPY", "CAD", "AUD"];

/// Symbols mapped to their usual code.
const SYMBOLS: [(char, &str); 4] = [('$', "USD"), ('€', "EUR"), ('£', "GBP"), ('¥', "JPY")];

pub fn is_known_code(s: &str) -> bool {
    KNOWN_CODES.contains(&s.to_uppercase().as_str())
}

/// Detect the document currency. Explicit code → High, symbol → Medium.
pub fn extract(text: &str) -> Option<ExtractedField> {
    if let Some(caps) = CURRENCY_CODE.captures(text) {
        let code = caps[1].to_uppercase();
        return Some(
            ExtractedField::rule(FieldValue::Text(code), Confidence::High)
                .with_raw(caps.get(0).unwrap().as_str()),
        );
    }

    for (symbol, code) in SYMBOLS {
        if text.contains(symbol) {
            return Some(
                ExtractedField::rule(FieldValue::Text(code.to_string()), Confidence::Medium)
                    .with_raw(symbol.to_string()),
            );
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn explicit_code_is_high() {
        let field = extract("Amount: 120.00 EUR").unwrap();
        assert_eq!(field.value.as_text(), Some("EUR"));
        assert_eq!(field.confidence, Confidence::High);
    }

    #[test]
    fn code_is_uppercased() {
        let field = extract("total 99.00 usd").unwrap();
        assert_eq!(field.value.as_text(), Some("USD"));
    }

    #[test]
    fn symbol_is_medium() {
        let field = extract("Total: £45.00").unwrap();
        assert_eq!(field.value.as_text(), Some("GBP"));
        assert_eq!(field.confidence, Confidence::Medium);
    }

    #[test]
    fn no_currency_marker_yields_nothing() {
        assert!(extract("total 99.00").is_none());
    }

    #[test]
    fn known_code_check() {
        assert!(is_known_code("usd"));
        assert!(is_known_code("EUR"));
        assert!(!is_known_code("XXX"));
    }
}
