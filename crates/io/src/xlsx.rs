// Excel file import (xlsx, xls, xlsb, ods)
//
// One-way, eager conversion: every sheet is read into column-major RawCells
// at open time, so reads after that are infallible and re-readable. Values
// arrive exactly as calamine exposes them; serial dates stay numeric for the
// inference engine to recognize.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use ledgerlens_infer::RawCell;

use crate::{find_table, header_name, read_table_column, IoError, LoadedTable, TableSource};

/// Guard against pathological files.
const MAX_ROWS: usize = 65536;
const MAX_COLS: usize = 256;

pub struct WorkbookSource {
    tables: Vec<LoadedTable>,
}

impl WorkbookSource {
    /// Open and fully load a workbook. The first row of each sheet is taken
    /// as the header row; blank header cells get positional names.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| IoError::Open(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(IoError::Open("workbook contains no sheets".into()));
        }

        let mut tables = Vec::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let range = workbook
                .worksheet_range(name)
                .map_err(|e| IoError::Read(format!("sheet '{name}': {e}")))?;
            tables.push(load_sheet(name, &range));
        }

        Ok(Self { tables })
    }
}

impl TableSource for WorkbookSource {
    fn tables(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    fn list_columns(&self, table: &str) -> Result<Vec<String>, IoError> {
        Ok(find_table(&self.tables, table)?.headers.clone())
    }

    fn read_column(&self, table: &str, column: &str) -> Result<Vec<RawCell>, IoError> {
        read_table_column(find_table(&self.tables, table)?, column)
    }
}

fn load_sheet(name: &str, range: &calamine::Range<Data>) -> LoadedTable {
    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return LoadedTable {
            name: name.to_string(),
            headers: Vec::new(),
            columns: Vec::new(),
        };
    }

    let rows = height.min(MAX_ROWS);
    let cols = width.min(MAX_COLS);

    let mut headers = Vec::with_capacity(cols);
    let mut columns: Vec<Vec<RawCell>> = vec![Vec::with_capacity(rows.saturating_sub(1)); cols];

    for (row_idx, row) in range.rows().take(rows).enumerate() {
        for (col_idx, cell) in row.iter().take(cols).enumerate() {
            let cell = convert_cell(cell);
            if row_idx == 0 {
                headers.push(header_name(cell.render(), col_idx));
            } else {
                columns[col_idx].push(cell);
            }
        }
    }

    LoadedTable {
        name: name.to_string(),
        headers,
        columns,
    }
}

fn convert_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) => {
            if s.is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(s.clone())
            }
        }
        Data::Float(n) => RawCell::Number(*n),
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        // Typed datetimes keep their serial representation; the engine's
        // serial-date strategy handles them uniformly with text serials.
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(_) => RawCell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("Transactions").unwrap();
        sheet.write_string(0, 0, "Date").unwrap();
        sheet.write_string(0, 1, "Amount").unwrap();
        sheet.write_string(0, 2, "Category").unwrap();
        sheet.write_string(1, 0, "1/15/2023").unwrap();
        sheet.write_string(1, 1, "$1,200.00").unwrap();
        sheet.write_string(1, 2, "Rent").unwrap();
        sheet.write_number(2, 0, 44927.0).unwrap();
        sheet.write_string(2, 1, "(350.00)").unwrap();
        // C3 left empty
        workbook.save(path).unwrap();
    }

    #[test]
    fn open_lists_sheets_and_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_fixture(&path);

        let source = WorkbookSource::open(&path).unwrap();
        assert_eq!(source.tables(), vec!["Transactions"]);
        assert_eq!(
            source.list_columns("Transactions").unwrap(),
            vec!["Date", "Amount", "Category"]
        );
    }

    #[test]
    fn read_column_returns_body_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_fixture(&path);

        let source = WorkbookSource::open(&path).unwrap();
        let dates = source.read_column("Transactions", "Date").unwrap();
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0], RawCell::Text("1/15/2023".into()));
        assert_eq!(dates[1], RawCell::Number(44927.0));

        // Ragged trailing cell reads back as Empty
        let categories = source.read_column("Transactions", "Category").unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0], RawCell::Text("Rent".into()));
        assert_eq!(categories[1], RawCell::Empty);
    }

    #[test]
    fn unknown_sheet_and_column_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_fixture(&path);

        let source = WorkbookSource::open(&path).unwrap();
        assert!(matches!(
            source.read_column("Nope", "Date"),
            Err(IoError::TableNotFound(_))
        ));
        assert!(matches!(
            source.read_column("Transactions", "Nope"),
            Err(IoError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn convert_preserves_variants() {
        assert_eq!(convert_cell(&Data::Empty), RawCell::Empty);
        assert_eq!(convert_cell(&Data::Int(42)), RawCell::Number(42.0));
        assert_eq!(
            convert_cell(&Data::String("x".into())),
            RawCell::Text("x".into())
        );
        assert_eq!(convert_cell(&Data::Bool(true)), RawCell::Bool(true));
    }
}
