//! Group-aggregate over normalized tables.
//!
//! Groups rows by the textual rendering of the group-by columns and folds
//! each measure column. BTreeMap grouping keeps output order deterministic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::model::{Column, Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFn {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl AggFn {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl std::str::FromStr for AggFn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            "avg" => Ok(Self::Avg),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown aggregate function: {other}")),
        }
    }
}

/// Accumulator for one measure within one group.
#[derive(Debug, Default, Clone)]
struct Acc {
    sum: Decimal,
    count: usize,
    min: Option<Value>,
    max: Option<Value>,
}

impl Acc {
    fn fold(&mut self, value: &Value) {
        if value.is_empty() {
            return;
        }
        self.count += 1;
        if let Value::Amount(d) = value {
            self.sum += d;
        }
        if self.min.as_ref().map_or(true, |m| value_lt(value, m)) {
            self.min = Some(value.clone());
        }
        if self.max.as_ref().map_or(true, |m| value_lt(m, value)) {
            self.max = Some(value.clone());
        }
    }

    fn finish(&self, agg: AggFn) -> Value {
        match agg {
            AggFn::Sum => Value::Amount(self.sum),
            AggFn::Count => Value::Amount(Decimal::from(self.count)),
            AggFn::Avg => {
                if self.count == 0 {
                    Value::Empty
                } else {
                    Value::Amount(self.sum / Decimal::from(self.count))
                }
            }
            AggFn::Min => self.min.clone().unwrap_or(Value::Empty),
            AggFn::Max => self.max.clone().unwrap_or(Value::Empty),
        }
    }
}

/// Strict ordering within a kind. Amounts, dates, and text order against
/// their own kind; mixed kinds are incomparable, so extrema keep first-seen.
fn value_lt(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Amount(x), Value::Amount(y)) => x < y,
        (Value::Date(x), Value::Date(y)) => x < y,
        (Value::Text(x), Value::Text(y)) => x < y,
        _ => false,
    }
}

impl Table {
    /// Group by `group_by` columns and fold every `measures` column with
    /// `agg`. The result table has the group columns followed by one column
    /// per measure, rows in deterministic group-key order.
    pub fn aggregate(
        &self,
        group_by: &[&str],
        measures: &[&str],
        agg: AggFn,
    ) -> Result<Table, StoreError> {
        if group_by.is_empty() {
            return Err(StoreError::EmptyGroupBy);
        }
        let group_idx: Vec<usize> = group_by
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<_, _>>()?;
        let measure_idx: Vec<usize> = measures
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<_, _>>()?;

        // Group key is the rendered group-by tuple; keep the first-seen
        // original values for output.
        let mut groups: BTreeMap<Vec<String>, (Vec<Value>, Vec<Acc>)> = BTreeMap::new();

        for row in 0..self.rows() {
            let key: Vec<String> = group_idx
                .iter()
                .map(|&i| self.columns[i].values[row].to_string())
                .collect();
            let entry = groups.entry(key).or_insert_with(|| {
                (
                    group_idx
                        .iter()
                        .map(|&i| self.columns[i].values[row].clone())
                        .collect(),
                    vec![Acc::default(); measure_idx.len()],
                )
            });
            for (acc, &col) in entry.1.iter_mut().zip(&measure_idx) {
                acc.fold(&self.columns[col].values[row]);
            }
        }

        let mut columns: Vec<Column> = group_by
            .iter()
            .map(|name| Column {
                name: (*name).to_string(),
                verdict: None,
                values: Vec::with_capacity(groups.len()),
            })
            .collect();
        columns.extend(measures.iter().map(|name| Column {
            name: format!("{}_{}", agg.name(), name),
            verdict: None,
            values: Vec::with_capacity(groups.len()),
        }));

        for (_, (key_values, accs)) in groups {
            for (col, value) in columns.iter_mut().zip(key_values) {
                col.values.push(value);
            }
            for (i, acc) in accs.iter().enumerate() {
                columns[group_by.len() + i].values.push(acc.finish(agg));
            }
        }

        Ok(Table { columns })
    }

    fn require_column(&self, name: &str) -> Result<usize, StoreError> {
        self.column_index(name)
            .ok_or_else(|| StoreError::ColumnNotFound {
                table: String::new(),
                column: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn amount(s: &str) -> Value {
        Value::Amount(Decimal::from_str(s).unwrap())
    }

    fn sample() -> Table {
        Table {
            columns: vec![
                Column {
                    name: "Category".into(),
                    verdict: None,
                    values: vec![
                        Value::Text("Rent".into()),
                        Value::Text("Salary".into()),
                        Value::Text("Utilities".into()),
                        Value::Text("Rent".into()),
                    ],
                },
                Column {
                    name: "Amount".into(),
                    verdict: None,
                    values: vec![amount("1000"), amount("3000"), amount("150"), amount("1000")],
                },
            ],
        }
    }

    #[test]
    fn sum_by_category() {
        let result = sample().aggregate(&["Category"], &["Amount"], AggFn::Sum).unwrap();
        assert_eq!(result.rows(), 3);
        // BTreeMap order: Rent, Salary, Utilities
        assert_eq!(result.columns[0].values[0], Value::Text("Rent".into()));
        assert_eq!(result.columns[1].name, "sum_Amount");
        assert_eq!(result.columns[1].values[0], amount("2000"));
        assert_eq!(result.columns[1].values[1], amount("3000"));
        assert_eq!(result.columns[1].values[2], amount("150"));
    }

    #[test]
    fn count_and_avg() {
        let table = sample();
        let counts = table.aggregate(&["Category"], &["Amount"], AggFn::Count).unwrap();
        assert_eq!(counts.columns[1].values[0], amount("2"));

        let avgs = table.aggregate(&["Category"], &["Amount"], AggFn::Avg).unwrap();
        assert_eq!(avgs.columns[1].values[0], amount("1000"));
    }

    #[test]
    fn min_max_over_dates() {
        let table = Table {
            columns: vec![
                Column {
                    name: "Who".into(),
                    verdict: None,
                    values: vec![Value::Text("a".into()), Value::Text("a".into())],
                },
                Column {
                    name: "When".into(),
                    verdict: None,
                    values: vec![
                        Value::Date(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()),
                        Value::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()),
                    ],
                },
            ],
        };
        let min = table.aggregate(&["Who"], &["When"], AggFn::Min).unwrap();
        assert_eq!(
            min.columns[1].values[0],
            Value::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
        );
        let max = table.aggregate(&["Who"], &["When"], AggFn::Max).unwrap();
        assert_eq!(
            max.columns[1].values[0],
            Value::Date(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap())
        );
    }

    #[test]
    fn empty_cells_excluded_from_count() {
        let table = Table {
            columns: vec![
                Column {
                    name: "K".into(),
                    verdict: None,
                    values: vec![Value::Text("x".into()), Value::Text("x".into())],
                },
                Column {
                    name: "V".into(),
                    verdict: None,
                    values: vec![amount("5"), Value::Empty],
                },
            ],
        };
        let result = table.aggregate(&["K"], &["V"], AggFn::Count).unwrap();
        assert_eq!(result.columns[1].values[0], amount("1"));
    }

    #[test]
    fn empty_group_by_rejected() {
        let err = sample().aggregate(&[], &["Amount"], AggFn::Sum).unwrap_err();
        assert!(matches!(err, StoreError::EmptyGroupBy));
    }

    #[test]
    fn deterministic_output_order() {
        let a = sample().aggregate(&["Category"], &["Amount"], AggFn::Sum).unwrap();
        let b = sample().aggregate(&["Category"], &["Amount"], AggFn::Sum).unwrap();
        for (ca, cb) in a.columns.iter().zip(&b.columns) {
            assert_eq!(ca.values, cb.values);
        }
    }
}
