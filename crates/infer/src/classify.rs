//! Column type classification.
//!
//! Scores a bounded sample of a column's non-empty values against three
//! independent detectors (date, number, string) and returns the verdict with
//! the highest confidence. Exact ties resolve Date > Number > String so
//! repeated classification of the same column is reproducible.

use regex::Regex;

use crate::config::ClassifierConfig;
use crate::date;
use crate::model::{
    ColumnType, DatePattern, FormatHint, NumberPattern, RawCell, StringSubtype, TypeVerdict,
};

pub struct ColumnTypeClassifier {
    config: ClassifierConfig,
    date_patterns: Vec<(DatePattern, Regex)>,
    number_patterns: Vec<(NumberPattern, Regex)>,
    reference_shape: Regex,
}

impl Default for ColumnTypeClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl ColumnTypeClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let date_patterns = vec![
            (DatePattern::SlashNumeric, r"^\d{1,2}/\d{1,2}/\d{4}$"),
            (DatePattern::IsoDash, r"^\d{4}-\d{1,2}-\d{1,2}$"),
            (DatePattern::DayMonthName, r"^\d{1,2}-[A-Za-z]{3}-\d{4}$"),
            (DatePattern::FiscalQuarter, r"^[Qq][1-4][\s-]?\d{4}$"),
            (DatePattern::MonthNameYear, r"^[A-Za-z]{3,9}\s\d{4}$"),
            (DatePattern::SerialNumber, r"^\d{5}$"),
        ];
        let number_patterns = vec![
            (NumberPattern::DollarGrouped, r"^\$[\d,]+\.?\d*$"),
            (NumberPattern::EuroGrouped, r"^€[\d.,]+$"),
            (NumberPattern::RupeeLakh, r"^₹[\d,]+\.?\d*$"),
            (NumberPattern::ParenNegative, r"^\([\d,]+\.?\d*\)$"),
            (NumberPattern::TrailingMinus, r"^[\d,]+\.?\d*-$"),
            (NumberPattern::Abbreviated, r"^[\d.]+[KMB]$"),
        ];

        Self {
            config,
            date_patterns: date_patterns
                .into_iter()
                .map(|(p, re)| (p, Regex::new(re).unwrap()))
                .collect(),
            number_patterns: number_patterns
                .into_iter()
                .map(|(p, re)| (p, Regex::new(re).unwrap()))
                .collect(),
            reference_shape: Regex::new(r"^[A-Z0-9-]+$").unwrap(),
        }
    }

    /// Classify one column from a sample of its raw cells.
    ///
    /// Empty cells are discarded before sampling. A column with zero usable
    /// values classifies as String with confidence 0.0.
    pub fn classify(&self, cells: &[RawCell]) -> TypeVerdict {
        let samples: Vec<String> = cells.iter().filter_map(|c| c.render()).collect();
        if samples.is_empty() {
            return TypeVerdict::empty();
        }

        let date = self.score_dates(&samples);
        let number = self.score_numbers(&samples);
        let string = self.score_strings(&samples);

        // Argmax with fixed precedence Date > Number > String on exact ties.
        let mut best = date;
        if number.confidence > best.confidence {
            best = number;
        }
        if string.confidence > best.confidence {
            best = string;
        }
        best
    }

    /// Score sampled values against the date-shape patterns and the generic
    /// date parse. Shape hits and parse hits both count, so a value
    /// satisfying both rules weighs double before the [0, 1] clamp; accepting
    /// both kinds of evidence is what lets a clean date column outrank the
    /// constant string score. Records the first pattern that matched anywhere
    /// in the scan as the detected format (first-match-wins, by contract).
    fn score_dates(&self, samples: &[String]) -> TypeVerdict {
        let mut hits = 0usize;
        let mut detected: Option<DatePattern> = None;

        for value in samples.iter().take(self.config.sample_cap) {
            let pattern = self
                .date_patterns
                .iter()
                .find(|(_, re)| re.is_match(value))
                .map(|(p, _)| *p);

            if let Some(pattern) = pattern {
                hits += 1;
                if detected.is_none() {
                    detected = Some(pattern);
                }
            }
            if date::parse_date_str(value, None).is_some() {
                hits += 1;
            }
        }

        let considered = samples.len().min(self.config.sample_cap);
        TypeVerdict {
            column_type: ColumnType::Date,
            confidence: clamped_confidence(hits, considered),
            format: detected.map(FormatHint::Date),
            string_subtype: None,
        }
    }

    /// Score sampled values against the currency-shape patterns and the
    /// symbol-stripped numeric parse, with the same double-evidence weighting
    /// and clamp as the date detector.
    fn score_numbers(&self, samples: &[String]) -> TypeVerdict {
        let mut hits = 0usize;
        let mut detected: Option<NumberPattern> = None;

        for value in samples.iter().take(self.config.sample_cap) {
            let pattern = self
                .number_patterns
                .iter()
                .find(|(_, re)| re.is_match(value))
                .map(|(p, _)| *p);

            if let Some(pattern) = pattern {
                hits += 1;
                if detected.is_none() {
                    detected = Some(pattern);
                }
            }
            if plain_numeric(value) {
                hits += 1;
            }
        }

        let considered = samples.len().min(self.config.sample_cap);
        TypeVerdict {
            column_type: ColumnType::Number,
            confidence: clamped_confidence(hits, considered),
            format: detected.map(FormatHint::Number),
            string_subtype: None,
        }
    }

    /// Sub-classify string values by keyword/shape heuristics over a smaller
    /// sample. The sub-type with the most hits wins; ties resolve in
    /// enumeration order. Confidence is a fixed constant by contract, not a
    /// computed score.
    fn score_strings(&self, samples: &[String]) -> TypeVerdict {
        // Hit counts indexed in enumeration (tie-break) order.
        const SUBTYPES: [StringSubtype; 5] = [
            StringSubtype::AccountName,
            StringSubtype::Description,
            StringSubtype::Reference,
            StringSubtype::Category,
            StringSubtype::General,
        ];
        let mut hits = [0usize; 5];

        for value in samples.iter().take(self.config.string_sample_cap) {
            let lower = value.to_lowercase();
            let subtype = if ACCOUNT_KEYWORDS.iter().any(|k| lower.contains(k)) {
                StringSubtype::AccountName
            } else if lower.len() > 20 && DESCRIPTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
                StringSubtype::Description
            } else if self.reference_shape.is_match(value) && value.len() < 20 {
                StringSubtype::Reference
            } else if lower.len() < 30 && !lower.chars().any(|c| c.is_ascii_digit()) {
                StringSubtype::Category
            } else {
                StringSubtype::General
            };
            hits[SUBTYPES.iter().position(|s| *s == subtype).unwrap()] += 1;
        }

        let best = SUBTYPES
            .iter()
            .zip(hits)
            .max_by_key(|(_, count)| *count)
            .map(|(s, _)| *s)
            .unwrap_or(StringSubtype::General);

        TypeVerdict {
            column_type: ColumnType::String,
            confidence: self.config.string_confidence,
            format: None,
            string_subtype: Some(best),
        }
    }
}

const ACCOUNT_KEYWORDS: &[&str] = &["account", "cash", "bank", "receivable", "payable"];
const DESCRIPTION_KEYWORDS: &[&str] = &["payment", "invoice", "transaction"];

fn clamped_confidence(hits: usize, considered: usize) -> f64 {
    if considered == 0 {
        return 0.0;
    }
    (hits as f64 / considered as f64).min(1.0)
}

/// Generic numeric fallback: strip currency symbols, grouping, parentheses,
/// and sign, then require the remainder to parse as a number. Alphabetic
/// tokens must not slip through.
fn plain_numeric(value: &str) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '₹' | ',' | '(' | ')' | '-' | ' '))
        .collect();
    !cleaned.is_empty() && cleaned.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<RawCell> {
        values.iter().map(|v| RawCell::from(*v)).collect()
    }

    #[test]
    fn all_empty_column_is_string_zero() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&[RawCell::Empty, RawCell::Empty]);
        assert_eq!(verdict, TypeVerdict::empty());
        assert_eq!(classifier.classify(&[]), TypeVerdict::empty());
    }

    #[test]
    fn clean_date_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["1/1/2023", "2/1/2023", "3/1/2023"]));
        assert_eq!(verdict.column_type, ColumnType::Date);
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.format, Some(FormatHint::Date(DatePattern::SlashNumeric)));
    }

    #[test]
    fn mostly_currency_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["$10", "$20", "abc"]));
        assert_eq!(verdict.column_type, ColumnType::Number);
        assert!(verdict.confidence >= 0.5);
        assert_eq!(verdict.format, Some(FormatHint::Number(NumberPattern::DollarGrouped)));
    }

    #[test]
    fn alphabetic_tokens_never_count_as_numbers() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["abc", "def", "ghi"]));
        assert_eq!(verdict.column_type, ColumnType::String);
        assert!(!plain_numeric("abc"));
    }

    #[test]
    fn serial_date_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["44927", "44928", "44929"]));
        assert_eq!(verdict.column_type, ColumnType::Date);
        assert_eq!(verdict.format, Some(FormatHint::Date(DatePattern::SerialNumber)));
    }

    #[test]
    fn quarter_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["Q1 2023", "Q2 2023", "Q3 2023", "Q4 2023"]));
        assert_eq!(verdict.column_type, ColumnType::Date);
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.format, Some(FormatHint::Date(DatePattern::FiscalQuarter)));
    }

    #[test]
    fn first_matching_pattern_recorded() {
        // ISO appears first in the column, slash later; first match wins
        // even though slash is more frequent.
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["2023-01-01", "1/2/2023", "1/3/2023"]));
        assert_eq!(verdict.format, Some(FormatHint::Date(DatePattern::IsoDash)));
    }

    #[test]
    fn accounting_negatives_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["(1,200.00)", "(350.00)", "1,500.00"]));
        assert_eq!(verdict.column_type, ColumnType::Number);
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.format, Some(FormatHint::Number(NumberPattern::ParenNegative)));
    }

    #[test]
    fn account_name_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&[
            "Cash and Equivalents",
            "Accounts Receivable",
            "Bank of Ontario Operating",
        ]));
        assert_eq!(verdict.column_type, ColumnType::String);
        assert_eq!(verdict.confidence, 0.8);
        assert_eq!(verdict.string_subtype, Some(StringSubtype::AccountName));
    }

    #[test]
    fn reference_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["INV-2023-001", "INV-2023-002", "PO-99"]));
        assert_eq!(verdict.column_type, ColumnType::String);
        assert_eq!(verdict.string_subtype, Some(StringSubtype::Reference));
    }

    #[test]
    fn category_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["Rent", "Utilities", "Travel"]));
        assert_eq!(verdict.column_type, ColumnType::String);
        assert_eq!(verdict.string_subtype, Some(StringSubtype::Category));
    }

    #[test]
    fn description_column() {
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&[
            "Monthly payment for office lease renewal",
            "Invoice settlement wire transfer fees Q1",
            "Recurring transaction against vendor 8812",
        ]));
        assert_eq!(verdict.column_type, ColumnType::String);
        assert_eq!(verdict.string_subtype, Some(StringSubtype::Description));
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = ColumnTypeClassifier::default();
        let column = cells(&["$10", "$20", "2023-01-01", "notes"]);
        assert_eq!(classifier.classify(&column), classifier.classify(&column));
    }

    #[test]
    fn sample_cap_bounds_consideration() {
        // 10 good dates then garbage beyond the cap: confidence computed
        // over the capped sample only.
        let config = ClassifierConfig {
            sample_cap: 10,
            ..ClassifierConfig::default()
        };
        let classifier = ColumnTypeClassifier::new(config);
        let mut values: Vec<RawCell> = (1..=10)
            .map(|d| RawCell::Text(format!("{d}/1/2023")))
            .collect();
        values.extend((0..90).map(|_| RawCell::from("garbage")));
        let verdict = classifier.classify(&values);
        assert_eq!(verdict.column_type, ColumnType::Date);
        assert_eq!(verdict.confidence, 1.0);
    }

    #[test]
    fn date_beats_number_on_exact_tie() {
        // A serial-date column matches both detectors at 1.0; precedence
        // order picks Date.
        let classifier = ColumnTypeClassifier::default();
        let verdict = classifier.classify(&cells(&["44927", "44928"]));
        assert_eq!(verdict.column_type, ColumnType::Date);
        assert_eq!(verdict.confidence, 1.0);
    }
}
