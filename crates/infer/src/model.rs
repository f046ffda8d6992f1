use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single untyped cell as it exists in the source table.
///
/// `Empty` covers absent/null cells. The engine never mutates cells; it only
/// reads their textual rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    /// Textual rendering used for pattern matching, or `None` for `Empty`.
    ///
    /// Numbers render without a trailing `.0` for whole values so that a
    /// serial-date column read from a spreadsheet as floats still looks like
    /// `44927` rather than `44927.0`.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{n}"))
                }
            }
            Self::Bool(b) => Some(if *b { "TRUE".into() } else { "FALSE".into() }),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

// ---------------------------------------------------------------------------
// Detected formats
// ---------------------------------------------------------------------------

/// Date-shaped pattern detected during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePattern {
    /// `MM/DD/YYYY` or `DD/MM/YYYY` (numeric slash date)
    SlashNumeric,
    /// `YYYY-MM-DD`
    IsoDash,
    /// `DD-Mon-YYYY`
    DayMonthName,
    /// `Q1 2024` / `Q1-2024`
    FiscalQuarter,
    /// `Mar 2024` / `March 2024`
    MonthNameYear,
    /// 5-digit spreadsheet serial
    SerialNumber,
}

/// Currency-shaped pattern detected during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberPattern {
    /// `$1,234.56`
    DollarGrouped,
    /// `€1.234,56`
    EuroGrouped,
    /// `₹1,23,456.78` (lakh/crore grouping)
    RupeeLakh,
    /// `(1,234.56)` accounting negative
    ParenNegative,
    /// `1234.56-`
    TrailingMinus,
    /// `1.2K` / `2.5M` / `1.2B`
    Abbreviated,
}

/// Advisory tag describing a previously detected pattern.
///
/// Passed from a column's `TypeVerdict` into the normalizer to bias
/// parse-strategy ordering. Purely advisory: parsing always falls back to
/// the full strategy search when the hinted strategy fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatHint {
    Date(DatePattern),
    Number(NumberPattern),
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// The three semantic column types, in tie-break precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Date,
    Number,
    String,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Sub-classification of string columns, in tie-break enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StringSubtype {
    AccountName,
    Description,
    Reference,
    Category,
    General,
}

impl std::fmt::Display for StringSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountName => write!(f, "account_name"),
            Self::Description => write!(f, "description"),
            Self::Reference => write!(f, "reference"),
            Self::Category => write!(f, "category"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Result of classifying one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeVerdict {
    pub column_type: ColumnType,
    /// Fraction of sampled values matching the winning type's detection
    /// rule, always in [0, 1].
    pub confidence: f64,
    /// First pattern that matched during the scan, if any.
    pub format: Option<FormatHint>,
    /// Present only when `column_type` is `String`.
    pub string_subtype: Option<StringSubtype>,
}

impl TypeVerdict {
    /// Verdict for a column with no usable samples.
    pub fn empty() -> Self {
        Self {
            column_type: ColumnType::String,
            confidence: 0.0,
            format: None,
            string_subtype: None,
        }
    }
}
