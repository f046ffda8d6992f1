//! Amount normalization.
//!
//! Turns currency-shaped text (`$1,234.56`, `(2,500.00)`, `€1.234,56`,
//! `₹1,23,456`, `1.5M`, `1234.56-`) into exact signed decimals. Unparseable
//! input is a normal `None` result, never an error.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use crate::model::{FormatHint, RawCell};

/// Parse one cell as an amount.
///
/// Empty cells are unparseable. The `hint` from a prior classification is
/// accepted for interface symmetry with date parsing, but the fixed strategy
/// order below is always authoritative for amounts.
pub fn parse_amount(cell: &RawCell, hint: Option<FormatHint>) -> Option<Decimal> {
    parse_amount_str(&cell.render()?, hint)
}

/// Parse a string as an amount. See [`parse_amount`].
pub fn parse_amount_str(raw: &str, _hint: Option<FormatHint>) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Abbreviated amounts (1.5K, 2M, 1.2B) are a terminal branch: the
    // abbreviation grammar has no room for parentheses or trailing signs.
    if let Some(amount) = parse_abbreviated(trimmed) {
        return Some(amount);
    }

    let mut s = trimmed.to_string();
    let mut negative = false;

    // Accounting negative: (1,234.56)
    if is_parenthesized_amount(&s) {
        s = s[1..s.len() - 1].to_string();
        negative = true;
    }

    // Trailing negative: 1234.56-
    if let Some(stripped) = s.strip_suffix('-') {
        s = stripped.to_string();
        negative = true;
    }

    // Drop currency symbols, spaces, and anything else that is not part of
    // the numeric token.
    let s: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let s = resolve_separators(&s);

    let amount = Decimal::from_str(&s).ok()?;
    Some(if negative { -amount } else { amount })
}

/// `<digits>[.<digits>]?[KkMmBb]` → value × 1e3 / 1e6 / 1e9.
fn parse_abbreviated(s: &str) -> Option<Decimal> {
    let re = Regex::new(r"^(\d+(?:\.\d+)?)([KkMmBb])$").unwrap();
    let caps = re.captures(s)?;
    let base = Decimal::from_str(caps.get(1).unwrap().as_str()).ok()?;
    let multiplier = match caps.get(2).unwrap().as_str() {
        "K" | "k" => Decimal::from(1_000),
        "M" | "m" => Decimal::from(1_000_000),
        _ => Decimal::from(1_000_000_000i64),
    };
    // Strip the scale the multiplication picks up so 1.5K renders as 1500,
    // not 1500.0.
    Some((base * multiplier).normalize())
}

/// Full parenthesization around a plain numeric token.
fn is_parenthesized_amount(s: &str) -> bool {
    let Some(inner) = s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) else {
        return false;
    };
    !inner.is_empty()
        && inner
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.'))
}

/// Decide which separators are grouping and which is the decimal point.
///
/// - Indian grouping (`1,23,456.78`): commas are thousands-style separators.
/// - Both present: the later-occurring separator is the decimal point, the
///   earlier kind is grouping (`1.234,56` European vs `1,234.56` US).
/// - One comma exactly 3 digits before the end: US thousands (`1,234`).
/// - Any remaining comma: European decimal (`12,5`).
fn resolve_separators(s: &str) -> String {
    let indian = Regex::new(r"^\d{1,3}(?:,\d{2})*(?:,\d{3})?(?:\.\d+)?$").unwrap();
    if indian.is_match(s) {
        return s.replace(',', "");
    }

    let last_comma = s.rfind(',');
    let last_period = s.rfind('.');

    match (last_comma, last_period) {
        (Some(c), Some(p)) => {
            if c > p {
                // European: 1.234,56
                s.replace('.', "").replace(',', ".")
            } else {
                // US: 1,234.56
                s.replace(',', "")
            }
        }
        (Some(c), None) => {
            if s.matches(',').count() == 1 && c + 4 == s.len() {
                // US thousands: 1,234
                s.replace(',', "")
            } else {
                // European decimal comma: 12,5
                s.replace(',', ".")
            }
        }
        _ => s.to_string(),
    }
}
