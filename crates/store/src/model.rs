use chrono::NaiveDate;
use ledgerlens_infer::TypeVerdict;
use rust_decimal::Decimal;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Normalized values
// ---------------------------------------------------------------------------

/// A canonical normalized cell. Locale-independent once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Empty,
    Amount(Decimal),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Amount(d) => write!(f, "{d}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Columns and tables
// ---------------------------------------------------------------------------

/// One normalized column, optionally carrying the verdict it was
/// normalized under.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub verdict: Option<TypeVerdict>,
    pub values: Vec<Value>,
}

/// A named table of equal-length columns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// One row as value refs, in column order.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }
}
