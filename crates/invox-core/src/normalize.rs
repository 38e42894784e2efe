//! Text normalization for OCR output.
//!
//! Cleans and bounds the raw text before rule and AI extraction. Newlines
//! survive normalization: the vendor and line-item heuristics are
//! line-oriented.

use crate::ocr::OcrResult;

/// Cleaned, bounded text ready for the extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// The normalized text body.
    pub text: String,

    /// Whether the body was truncated to the character budget.
    pub truncated: bool,
}

impl NormalizedText {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Pure normalizer: strips control characters, collapses space runs, and
/// truncates to a character budget at a whitespace boundary.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    max_chars: usize,
}

impl TextNormalizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn normalize(&self, ocr: &OcrResult) -> NormalizedText {
        self.normalize_text(&ocr.text)
    }

    pub fn normalize_text(&self, raw: &str) -> NormalizedText {
        let cleaned = clean(raw);
        let (text, truncated) = truncate_at_boundary(&cleaned, self.max_chars);
        NormalizedText { text, truncated }
    }
}

/// Strip control characters and collapse horizontal whitespace runs.
/// Lines keep their boundaries; leading and trailing spaces are dropped.
fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if c == '\n' {
            while out.ends_with(' ') {
                out.pop();
            }
            out.push('\n');
            pending_space = false;
        } else if c.is_whitespace() {
            // Tabs are control characters too, so whitespace is checked first
            pending_space = true;
        } else if c.is_control() {
            // Remaining control characters vanish
        } else {
            if pending_space && !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }

    out
}

/// Cut `text` down to at most `max_chars` characters, backing off to the
/// last whitespace so no word is split.
fn truncate_at_boundary(text: &str, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    let head = &text[..cut];
    let boundary = head.rfind(char::is_whitespace).unwrap_or(cut);

    (text[..boundary].trim_end().to_string(), true)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn strips_control_characters() {
        let normalizer = TextNormalizer::new(4000);
        let result = normalizer.normalize_text("Acme\u{0000} Corp\u{0007}\r\nInvoice");
        assert_eq!(result.text, "Acme Corp\nInvoice");
        assert!(!result.truncated);
    }

    #[test]
    fn collapses_space_runs_but_keeps_lines() {
        let normalizer = TextNormalizer::new(4000);
        let result = normalizer.normalize_text("Total:    \t $100.00\n   Tax:  $8.00  ");
        assert_eq!(result.text, "Total: $100.00\nTax: $8.00");
    }

    #[test]
    fn lone_tab_becomes_a_space() {
        let normalizer = TextNormalizer::new(4000);
        let result = normalizer.normalize_text("Widget\t100.00");
        assert_eq!(result.text, "Widget 100.00");
    }

    #[test]
    fn truncates_at_word_boundary() {
        let normalizer = TextNormalizer::new(12);
        let result = normalizer.normalize_text("alpha beta gamma delta");

        assert!(result.truncated);
        assert_eq!(result.text, "alpha beta");
    }

    #[test]
    fn short_text_is_untouched() {
        let normalizer = TextNormalizer::new(100);
        let result = normalizer.normalize_text("Invoice #42");
        assert_eq!(result.text, "Invoice #42");
        assert!(!result.truncated);
    }

    #[test]
    fn normalize_reads_ocr_text() {
        let normalizer = TextNormalizer::new(100);
        let ocr = OcrResult::from_text("Vendor   Inc", 80.0);
        assert_eq!(normalizer.normalize(&ocr).text, "Vendor Inc");
    }
}
