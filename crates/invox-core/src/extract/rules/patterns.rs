//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Labeled totals ("Grand Total: $1,234.56", "Amount due 99.00").
    // A bare "due" label is deliberately absent: "Due: 01/15/2024" would
    // capture the date's leading digits as an amount.
    pub static ref AMOUNT_LABELED: Regex = Regex::new(
        r"(?i)(?:grand\s+total|amount\s+due|balance\s+due|total|amount|balance)[\s:]+\$?\s*(\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?)"
    ).unwrap();

    // Symbol-prefixed amounts ("$250.00", "€ 99.50")
    pub static ref AMOUNT_SYMBOL: Regex = Regex::new(
        r"[$€£]\s?(\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?)"
    ).unwrap();

    // Bare decimal amounts ("1,234.56")
    pub static ref AMOUNT_BARE: Regex = Regex::new(
        r"\b(\d{1,3}(?:,\d{3})*\.\d{2})\b"
    ).unwrap();

    // Labeled tax amounts ("Sales Tax: $8.00", "VAT 23.00")
    pub static ref TAX_LABELED: Regex = Regex::new(
        r"(?i)(?:sales\s+tax|tax|vat|gst)[\s:]+\$?\s*(\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?)"
    ).unwrap();

    // Labeled dates; the capture is handed to the date grammar
    pub static ref DATE_LABELED: Regex = Regex::new(
        r"(?i)(?:invoice\s+date|bill\s+date|issue\s+date|date\s+issued|issued|date)[\s:]+(.+?)(?:\n|$)"
    ).unwrap();

    // Generic date shapes
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,4}[/-]\d{1,2}[/-]\d{1,4})\b"
    ).unwrap();

    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(
        r"(?i)\b((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})\b"
    ).unwrap();

    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"(?i)\b(\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{4})\b"
    ).unwrap();

    // Invoice number: anchored forms first
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)invoice\s*(?:no\.?|number|num\.?)?\s*[#:]+\s*([A-Za-z0-9][A-Za-z0-9/_-]{2,})"
    ).unwrap();

    pub static ref INVOICE_NUMBER_WORDED: Regex = Regex::new(
        r"(?i)invoice\s+(?:no\.?|number|num\.?)\s+([A-Za-z0-9][A-Za-z0-9/_-]{2,})"
    ).unwrap();

    pub static ref INV_SHORT: Regex = Regex::new(
        r"(?i)\binv\.?\s*[#:]+\s*([A-Za-z0-9][A-Za-z0-9/_-]{2,})"
    ).unwrap();

    pub static ref REF_LABELED: Regex = Regex::new(
        r"(?i)\bref(?:erence)?\.?\s*[#:]+\s*([A-Za-z0-9][A-Za-z0-9/_-]{2,})"
    ).unwrap();

    pub static ref HASH_NUMBER: Regex = Regex::new(
        r"#\s*([A-Za-z0-9][A-Za-z0-9-]{2,})"
    ).unwrap();

    // Currency codes and symbols
    pub static ref CURRENCY_CODE: Regex = Regex::new(
        r"(?i)\b(USD|EUR|GBP|JPY|CAD|AUD)\b"
    ).unwrap();

    // Vendor heuristics
    pub static ref COMPANY_SUFFIX: Regex = Regex::new(
        r"(?i)\b(?:inc|llc|corp|ltd|gmbh|company|co)\.?(?:\s|$|,)"
    ).unwrap();

    pub static ref DOCUMENT_HEADER: Regex = Regex::new(
        r"(?i)^(?:invoice|bill|receipt|statement|date|total|page)\b"
    ).unwrap();
}
