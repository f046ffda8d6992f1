//! Classify-then-normalize pipeline shared by the `classify`, `normalize`,
//! and `aggregate` commands.

use ledgerlens_infer::{
    parse_amount, parse_date, ClassifierConfig, ColumnType, ColumnTypeClassifier, RawCell,
    TypeVerdict,
};
use ledgerlens_io::TableSource;
use ledgerlens_store::{Column, Table, Value};

use serde::Serialize;

use crate::CliError;

/// Per-column classification report.
#[derive(Debug, Serialize)]
pub struct ColumnVerdict {
    pub name: String,
    pub verdict: TypeVerdict,
}

pub fn classify_table(
    source: &dyn TableSource,
    table: &str,
    config: &ClassifierConfig,
) -> Result<Vec<ColumnVerdict>, CliError> {
    let classifier = ColumnTypeClassifier::new(config.clone());
    let columns = source.list_columns(table).map_err(CliError::from_io)?;

    columns
        .into_iter()
        .map(|name| {
            let cells = source.read_column(table, &name).map_err(CliError::from_io)?;
            Ok(ColumnVerdict {
                verdict: classifier.classify(&cells),
                name,
            })
        })
        .collect()
}

/// Classify every column, then normalize each cell with the column verdict
/// as a parse hint. Unparseable non-empty cells pass through as text so a
/// reviewer can still see them; they are never silently dropped.
pub fn normalize_table(
    source: &dyn TableSource,
    table: &str,
    config: &ClassifierConfig,
) -> Result<Table, CliError> {
    let classifier = ColumnTypeClassifier::new(config.clone());
    let names = source.list_columns(table).map_err(CliError::from_io)?;

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let cells = source.read_column(table, &name).map_err(CliError::from_io)?;
        let verdict = classifier.classify(&cells);
        let values = cells
            .iter()
            .map(|cell| normalize_cell(cell, &verdict))
            .collect();
        columns.push(Column {
            name,
            verdict: Some(verdict),
            values,
        });
    }

    Ok(Table { columns })
}

fn normalize_cell(cell: &RawCell, verdict: &TypeVerdict) -> Value {
    if cell.is_empty() {
        return Value::Empty;
    }
    match verdict.column_type {
        ColumnType::Date => match parse_date(cell, verdict.format) {
            Some(date) => Value::Date(date),
            None => passthrough(cell),
        },
        ColumnType::Number => match parse_amount(cell, verdict.format) {
            Some(amount) => Value::Amount(amount),
            None => passthrough(cell),
        },
        ColumnType::String => passthrough(cell),
    }
}

fn passthrough(cell: &RawCell) -> Value {
    match cell.render() {
        Some(text) => Value::Text(text),
        None => Value::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerlens_io::CsvSource;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn source() -> CsvSource {
        let content = "\
Date,Amount,Category
1/15/2023,\"$1,200.00\",Rent
2/1/2023,\"(350.00)\",Utilities
3/1/2023,n/a,Rent
";
        CsvSource::from_string("txns".into(), content, b',').unwrap()
    }

    #[test]
    fn verdicts_cover_all_columns() {
        let verdicts = classify_table(&source(), "txns", &ClassifierConfig::default()).unwrap();
        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0].verdict.column_type, ColumnType::Date);
        assert_eq!(verdicts[1].verdict.column_type, ColumnType::Number);
        assert_eq!(verdicts[2].verdict.column_type, ColumnType::String);
    }

    #[test]
    fn normalization_produces_canonical_values() {
        let table = normalize_table(&source(), "txns", &ClassifierConfig::default()).unwrap();
        assert_eq!(
            table.columns[0].values[0],
            Value::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
        );
        assert_eq!(
            table.columns[1].values[1],
            Value::Amount(Decimal::from_str("-350.00").unwrap())
        );
    }

    #[test]
    fn unparseable_cells_pass_through_as_text() {
        let table = normalize_table(&source(), "txns", &ClassifierConfig::default()).unwrap();
        assert_eq!(table.columns[1].values[2], Value::Text("n/a".into()));
    }
}
