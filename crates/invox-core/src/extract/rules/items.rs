//! Line item extraction.

use rust_decimal::Decimal;

use super::amounts::parse_amount;
use super::patterns::AMOUNT_SYMBOL;
use crate::models::record::{Confidence, ExtractedField, FieldValue, LineItem};

/// Longest description kept per item.
const MAX_DESCRIPTION: usize = 100;

/// Summary lines that look like items but are totals.
const SUMMARY_PREFIXES: [&str; 6] = ["total", "subtotal", "tax", "balance", "amount", "grand"];

/// Extract line items. OCR table rows → High; text lines carrying a
/// symbol-prefixed amount → Medium. Capped at `max_items`.
pub fn extract(
    text: &str,
    tables: &[Vec<Vec<String>>],
    max_items: usize,
) -> Option<ExtractedField> {
    let from_tables = items_from_tables(tables, max_items);
    if !from_tables.is_empty() {
        return Some(ExtractedField::rule(
            FieldValue::Items(from_tables),
            Confidence::High,
        ));
    }

    let from_lines = items_from_lines(text, max_items);
    if !from_lines.is_empty() {
        return Some(ExtractedField::rule(
            FieldValue::Items(from_lines),
            Confidence::Medium,
        ));
    }

    None
}

/// Read items out of detected table rows: the longest non-numeric cell is
/// the description, the last amount-like cell is the line total.
fn items_from_tables(tables: &[Vec<Vec<String>>], max_items: usize) -> Vec<LineItem> {
    let mut items = Vec::new();

    for table in tables {
        for row in table {
            if items.len() >= max_items {
                return items;
            }

            let amounts: Vec<Decimal> = row
                .iter()
                .filter_map(|cell| parse_amount(cell))
                .filter(|d| d.is_sign_positive() && !d.is_zero())
                .collect();

            let description = row
                .iter()
                .filter(|cell| parse_amount(cell).is_none())
                .filter(|cell| cell.chars().any(char::is_alphabetic))
                .max_by_key(|cell| cell.trim().len());

            let (Some(description), Some(amount)) = (description, amounts.last()) else {
                continue;
            };

            let description = description.trim();
            if description.len() < 3 || is_summary(description) {
                continue;
            }

            items.push(LineItem {
                description: truncate(description),
                amount: *amount,
            });
        }
    }

    items
}

/// Fallback: scan text lines carrying a symbol-prefixed amount.
fn items_from_lines(text: &str, max_items: usize) -> Vec<LineItem> {
    let mut items = Vec::new();

    for line in text.lines() {
        if items.len() >= max_items {
            break;
        }

        let line = line.trim();
        if line.len() < 10 || is_summary(line) {
            continue;
        }

        let Some(caps) = AMOUNT_SYMBOL.captures(line) else {
            continue;
        };
        let Some(amount) = parse_amount(&caps[1]).filter(|d| d.is_sign_positive() && !d.is_zero())
        else {
            continue;
        };

        // Description is the line minus the amount and any leading ordinal
        let full = caps.get(0).unwrap();
        let mut description = format!("{}{}", &line[..full.start()], &line[full.end()..]);
        description = description
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
            .trim()
            .to_string();

        if description.len() > 3 {
            items.push(LineItem {
                description: truncate(&description),
                amount,
            });
        }
    }

    items
}

fn is_summary(s: &str) -> bool {
    let lower = s.to_lowercase();
    SUMMARY_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn truncate(s: &str) -> String {
    s.chars().take(MAX_DESCRIPTION).collect()
}
