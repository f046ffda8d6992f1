//! `--where` expression parsing.
//!
//! Grammar: `column OP operand` with no whitespace around OP. Multi-char
//! operators are tried before their single-char prefixes so `!=` never
//! parses as a column named `Amount!`.

use std::str::FromStr;

use chrono::NaiveDate;
use ledgerlens_infer::parse_date_str;
use ledgerlens_store::{Op, Predicate, Value};
use rust_decimal::Decimal;

use crate::CliError;

const OPERATORS: [(&str, Op); 5] = [
    ("!=", Op::Ne),
    ("=", Op::Eq),
    ("<", Op::Lt),
    (">", Op::Gt),
    ("~", Op::Contains),
];

pub fn parse_where(expr: &str) -> Result<Predicate, CliError> {
    for (token, op) in OPERATORS {
        if let Some(at) = expr.find(token) {
            let column = expr[..at].trim();
            let raw = expr[at + token.len()..].trim();
            if column.is_empty() {
                return Err(CliError::args(format!(
                    "missing column name in filter '{expr}'"
                )));
            }
            return Ok(Predicate {
                column: column.to_string(),
                op,
                operand: type_operand(raw),
            });
        }
    }
    Err(CliError::args(format!(
        "filter '{expr}' has no operator (expected one of =, !=, <, >, ~)"
    )))
}

/// Type the operand the way normalized cells are typed, so comparisons hit
/// the same kind. Plain decimals become amounts, date-shaped text becomes a
/// date, everything else stays text. Decimal::from_str is used rather than
/// the lenient amount parser so references like `INV-01` stay textual.
fn type_operand(raw: &str) -> Value {
    if let Ok(d) = Decimal::from_str(raw) {
        return Value::Amount(d);
    }
    if let Some(date) = parse_iso_or_any(raw) {
        return Value::Date(date);
    }
    Value::Text(raw.to_string())
}

fn parse_iso_or_any(raw: &str) -> Option<NaiveDate> {
    // Only accept date-shaped operands; bare words fall through to Text.
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    parse_date_str(raw, None)
}
