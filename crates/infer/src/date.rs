//! Date normalization.
//!
//! Handles spreadsheet serial dates, fiscal quarter notation, month-name
//! forms, and a fixed table of explicit layouts. Ambiguous day/month
//! ordering (e.g. `03/04/2024`) is resolved purely by format-list order:
//! US `%m/%d/%Y` is attempted before `%d/%m/%Y`. This is deterministic and
//! locale-blind by contract.

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::model::{DatePattern, FormatHint, RawCell};

/// Explicit date layouts, attempted in listed order. First success wins.
const FIXED_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%b-%Y",
    "%Y/%m/%d",
    "%d/%m/%y",
    "%m/%d/%y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const MONTH_ABBREV: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const MONTH_FULL: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parse one cell as a calendar date. Empty cells are unparseable.
///
/// A date-shaped `hint` moves the matching strategy to the front; the full
/// strategy order still runs when the hinted strategy fails, so a hint can
/// never lose a parse the unhinted path would find.
pub fn parse_date(cell: &RawCell, hint: Option<FormatHint>) -> Option<NaiveDate> {
    parse_date_str(&cell.render()?, hint)
}

/// Parse a string as a calendar date. See [`parse_date`].
pub fn parse_date_str(raw: &str, hint: Option<FormatHint>) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(FormatHint::Date(pattern)) = hint {
        if let Some(date) = try_hinted(s, pattern) {
            return Some(date);
        }
    }

    parse_serial(s)
        .or_else(|| parse_quarter(s))
        .or_else(|| parse_month_year(s))
        .or_else(|| parse_mon_yy(s))
        .or_else(|| parse_fixed_formats(s))
}

fn try_hinted(s: &str, pattern: DatePattern) -> Option<NaiveDate> {
    match pattern {
        DatePattern::SerialNumber => parse_serial(s),
        DatePattern::FiscalQuarter => parse_quarter(s),
        DatePattern::MonthNameYear => parse_month_year(s),
        DatePattern::IsoDash => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
        DatePattern::DayMonthName => NaiveDate::parse_from_str(s, "%d-%b-%Y").ok(),
        DatePattern::SlashNumeric => NaiveDate::parse_from_str(s, "%m/%d/%Y")
            .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
            .ok(),
    }
}

/// Exactly 5 digits → days since the 1900-system spreadsheet epoch.
///
/// Day 1 is 1899-12-31 under the dominant format's off-by-two leap-year-bug
/// convention, i.e. 1900-01-01 + (n − 2) days. Serial 44927 → 2023-01-01.
fn parse_serial(s: &str) -> Option<NaiveDate> {
    if s.len() != 5 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let serial: u64 = s.parse().ok()?;
    NaiveDate::from_ymd_opt(1900, 1, 1)?.checked_add_days(Days::new(serial.checked_sub(2)?))
}

/// `Q[1-4]` + optional separator + 2-or-4-digit year → first day of quarter.
fn parse_quarter(s: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^[Qq]([1-4])[\s-]?(\d{2,4})$").unwrap();
    let caps = re.captures(s)?;
    let quarter: u32 = caps.get(1).unwrap().as_str().parse().ok()?;
    let year_str = caps.get(2).unwrap().as_str();
    let year = expand_year(year_str.parse().ok()?, year_str.len());
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}

/// `Mar 2024` / `March 2024` → first of that month.
fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^([A-Za-z]{3,9})\s(\d{4})$").unwrap();
    let caps = re.captures(s)?;
    let month = month_from_name(caps.get(1).unwrap().as_str())?;
    let year: i32 = caps.get(2).unwrap().as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `Dec-23` → first of that month, 2-digit-year convention.
fn parse_mon_yy(s: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^([A-Za-z]{3})-(\d{2})$").unwrap();
    let caps = re.captures(s)?;
    let month = month_from_name(caps.get(1).unwrap().as_str())?;
    let year = expand_year(caps.get(2).unwrap().as_str().parse().ok()?, 2);
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_fixed_formats(s: &str) -> Option<NaiveDate> {
    FIXED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Abbreviated then full English month names, case-insensitive.
fn month_from_name(name: &str) -> Option<u32> {
    let position = MONTH_ABBREV
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .or_else(|| MONTH_FULL.iter().position(|m| m.eq_ignore_ascii_case(name)))?;
    Some(position as u32 + 1)
}

/// 2-digit years < 50 map to the 2000s, ≥ 50 to the 1900s.
fn expand_year(year: i32, digits: usize) -> i32 {
    if digits == 2 {
        if year < 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}
