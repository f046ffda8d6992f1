//! `ledgerlens-io` — table sources for the inference engine.
//!
//! Thin wrappers with no disambiguation logic: they enumerate tables
//! (sheets) and hand over column-oriented `RawCell` values exactly as the
//! file encodes them.

pub mod csv;
pub mod xlsx;

use std::fmt;

use ledgerlens_infer::RawCell;

pub use crate::csv::CsvSource;
pub use crate::xlsx::WorkbookSource;

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened or is not a recognized format.
    Open(String),
    /// Requested table (sheet) does not exist.
    TableNotFound(String),
    /// Requested column does not exist in the table.
    ColumnNotFound { table: String, column: String },
    /// Read/decode failure partway through a file.
    Read(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "open error: {msg}"),
            Self::TableNotFound(table) => write!(f, "table not found: {table}"),
            Self::ColumnNotFound { table, column } => {
                write!(f, "table '{table}': no column '{column}'")
            }
            Self::Read(msg) => write!(f, "read error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}

/// A loaded source of one or more named tables of raw cells.
///
/// Columns are finite and re-readable; each call returns a fresh copy, so
/// callers may fan classification out across columns freely.
pub trait TableSource {
    /// Table (sheet) names in file order.
    fn tables(&self) -> Vec<String>;

    /// Column identifiers for one table, in header order.
    fn list_columns(&self, table: &str) -> Result<Vec<String>, IoError>;

    /// All body cells of one column, top to bottom. Absent cells are
    /// `RawCell::Empty`.
    fn read_column(&self, table: &str, column: &str) -> Result<Vec<RawCell>, IoError>;
}

/// In-memory table shared by both source implementations: a header row plus
/// column-major body cells.
#[derive(Debug, Clone)]
pub(crate) struct LoadedTable {
    pub name: String,
    pub headers: Vec<String>,
    pub columns: Vec<Vec<RawCell>>,
}

impl LoadedTable {
    pub fn rows(&self) -> usize {
        self.columns.iter().map(|c| c.len()).max().unwrap_or(0)
    }
}

pub(crate) fn find_table<'a>(
    tables: &'a [LoadedTable],
    name: &str,
) -> Result<&'a LoadedTable, IoError> {
    tables
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| IoError::TableNotFound(name.to_string()))
}

pub(crate) fn read_table_column(table: &LoadedTable, column: &str) -> Result<Vec<RawCell>, IoError> {
    let idx = table
        .headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| IoError::ColumnNotFound {
            table: table.name.clone(),
            column: column.to_string(),
        })?;
    let mut cells = table.columns[idx].clone();
    // Ragged rows: pad short columns so every column reports the same length.
    cells.resize(table.rows(), RawCell::Empty);
    Ok(cells)
}

/// Header fallback for blank header cells.
pub(crate) fn header_name(raw: Option<String>, index: usize) -> String {
    match raw {
        Some(h) if !h.trim().is_empty() => h,
        _ => format!("column_{}", index + 1),
    }
}

/// Summary of one table for enumeration/preview surfaces.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

pub fn describe(source: &dyn TableSource) -> Result<Vec<TableInfo>, IoError> {
    source
        .tables()
        .iter()
        .map(|name| {
            let columns = source.list_columns(name)?;
            let rows = match columns.first() {
                Some(first) => source.read_column(name, first)?.len(),
                None => 0,
            };
            Ok(TableInfo {
                name: name.clone(),
                rows,
                columns,
            })
        })
        .collect()
}
