//! `ledgerlens-store` — named-table store of normalized columns.
//!
//! Thin storage collaborator: holds tables of canonical values produced by
//! the inference engine and answers filter and group-aggregate queries. No
//! disambiguation logic and no persistence across runs.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod model;

use std::collections::HashMap;

pub use aggregate::AggFn;
pub use error::StoreError;
pub use filter::{Op, Predicate};
pub use model::{Column, Table, Value};

/// Sink for normalized columns, written one column at a time.
pub trait TableSink {
    fn write_column(
        &mut self,
        table: &str,
        column: Column,
    ) -> Result<(), StoreError>;
}

/// In-memory named-table store with per-table metadata.
#[derive(Debug, Default)]
pub struct Store {
    tables: HashMap<String, Table>,
    metadata: HashMap<String, HashMap<String, String>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_table(&mut self, name: &str, table: Table, metadata: HashMap<String, String>) {
        self.tables.insert(name.to_string(), table);
        self.metadata.insert(name.to_string(), metadata);
    }

    pub fn table(&self, name: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    pub fn metadata(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.metadata.get(name)
    }

    /// Table names in deterministic order.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }
}

impl TableSink for Store {
    /// Append one column to a table, creating the table on first write.
    /// Every column of a table must carry the same row count.
    fn write_column(&mut self, table: &str, column: Column) -> Result<(), StoreError> {
        let entry = self.tables.entry(table.to_string()).or_default();
        if !entry.columns.is_empty() && entry.rows() != column.values.len() {
            return Err(StoreError::LengthMismatch {
                table: table.to_string(),
                column: column.name,
                expected: entry.rows(),
                actual: column.values.len(),
            });
        }
        entry.columns.push(column);
        Ok(())
    }
}
