use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    TableNotFound(String),
    ColumnNotFound { table: String, column: String },
    /// Aggregation requires at least one group-by column.
    EmptyGroupBy,
    /// A written column's length disagrees with the table's row count.
    LengthMismatch { table: String, column: String, expected: usize, actual: usize },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableNotFound(name) => write!(f, "table not found: {name}"),
            Self::ColumnNotFound { table, column } => {
                write!(f, "table '{table}': no column '{column}'")
            }
            Self::EmptyGroupBy => write!(f, "aggregation requires a group-by column"),
            Self::LengthMismatch { table, column, expected, actual } => write!(
                f,
                "table '{table}': column '{column}' has {actual} rows, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for StoreError {}
