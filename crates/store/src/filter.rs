//! Row filtering over normalized tables.

use crate::error::StoreError;
use crate::model::{Table, Value};

/// Comparison operator for one predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    /// Case-insensitive substring match on the textual rendering.
    Contains,
}

/// One column predicate. Rows must satisfy every predicate to survive.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub column: String,
    pub op: Op,
    pub operand: Value,
}

impl Predicate {
    fn matches(&self, cell: &Value) -> bool {
        match self.op {
            Op::Eq => compare(cell, &self.operand) == Some(std::cmp::Ordering::Equal),
            Op::Ne => {
                matches!(compare(cell, &self.operand), Some(o) if o != std::cmp::Ordering::Equal)
            }
            Op::Lt => compare(cell, &self.operand) == Some(std::cmp::Ordering::Less),
            Op::Gt => compare(cell, &self.operand) == Some(std::cmp::Ordering::Greater),
            Op::Contains => cell
                .to_string()
                .to_lowercase()
                .contains(&self.operand.to_string().to_lowercase()),
        }
    }
}

/// Compare two values of the same kind; mixed kinds are incomparable, so
/// typed predicates never match mistyped cells.
fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Amount(x), Value::Amount(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Empty, Value::Empty) => Some(std::cmp::Ordering::Equal),
        _ => None,
    }
}

impl Table {
    /// Keep rows satisfying all predicates. Column verdicts carry over.
    pub fn filter(&self, predicates: &[Predicate]) -> Result<Table, StoreError> {
        let indices: Vec<usize> = predicates
            .iter()
            .map(|p| {
                self.column_index(&p.column)
                    .ok_or_else(|| StoreError::ColumnNotFound {
                        table: String::new(),
                        column: p.column.clone(),
                    })
            })
            .collect::<Result<_, _>>()?;

        let keep: Vec<usize> = (0..self.rows())
            .filter(|&row| {
                predicates
                    .iter()
                    .zip(&indices)
                    .all(|(p, &col)| p.matches(&self.columns[col].values[row]))
            })
            .collect();

        Ok(Table {
            columns: self
                .columns
                .iter()
                .map(|c| crate::model::Column {
                    name: c.name.clone(),
                    verdict: c.verdict.clone(),
                    values: keep.iter().map(|&i| c.values[i].clone()).collect(),
                })
                .collect(),
        })
    }
}
