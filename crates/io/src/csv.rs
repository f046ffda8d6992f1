// CSV/TSV import
//
// Single-table source: one file, one table. Delimiter is sniffed unless
// given; bytes that are not UTF-8 fall back to Windows-1252 (common for
// Excel-exported CSVs).

use std::io::Read;
use std::path::Path;

use ledgerlens_infer::RawCell;

use crate::{find_table, header_name, read_table_column, IoError, LoadedTable, TableSource};

pub struct CsvSource {
    tables: Vec<LoadedTable>,
}

impl CsvSource {
    /// Open a CSV/TSV file, sniffing the delimiter. The table is named
    /// after the file stem.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let content = read_file_as_utf8(path)?;
        let delimiter = sniff_delimiter(&content);
        Self::from_string(table_name_for(path), &content, delimiter)
    }

    pub fn open_with_delimiter(path: &Path, delimiter: u8) -> Result<Self, IoError> {
        let content = read_file_as_utf8(path)?;
        Self::from_string(table_name_for(path), &content, delimiter)
    }

    /// Parse CSV text already in memory. First record is the header row.
    pub fn from_string(name: String, content: &str, delimiter: u8) -> Result<Self, IoError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut headers: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<RawCell>> = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| IoError::Read(e.to_string()))?;
            if row_idx == 0 {
                headers = record
                    .iter()
                    .enumerate()
                    .map(|(i, h)| header_name(Some(h.to_string()), i))
                    .collect();
                columns = vec![Vec::new(); headers.len()];
                continue;
            }
            for (col_idx, field) in record.iter().enumerate() {
                // Flexible rows may be wider than the header row; extra
                // fields get positional columns.
                if col_idx >= columns.len() {
                    headers.push(header_name(None, col_idx));
                    columns.push(vec![RawCell::Empty; row_idx - 1]);
                }
                columns[col_idx].push(if field.is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(field.to_string())
                });
            }
            // Pad columns the row did not reach.
            for column in columns.iter_mut() {
                if column.len() < row_idx {
                    column.push(RawCell::Empty);
                }
            }
        }

        Ok(Self {
            tables: vec![LoadedTable {
                name,
                headers,
                columns,
            }],
        })
    }
}

impl TableSource for CsvSource {
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

fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string())
}

/// Pick the delimiter whose field count stays stable across a ten-line
/// prefix of the file. A candidate must split the header line into more
/// than one field to be considered; comma is the fallback when nothing
/// does.
pub fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    let lines: Vec<&str> = content.lines().take(10).collect();

    let mut best = (0u64, b',');
    for delim in CANDIDATES {
        let counts: Vec<usize> = lines.iter().map(|line| field_count(line, delim)).collect();
        let header_fields = counts.first().copied().unwrap_or(0);
        if header_fields <= 1 {
            continue;
        }
        // Lines agreeing with the header, weighted by width, so a delimiter
        // that splits every line the same way beats one that splits only a
        // few lines into more pieces.
        let consistent = counts.iter().filter(|&&c| c == header_fields).count() as u64;
        let score = consistent * header_fields as u64;
        if score > best.0 {
            best = (score, delim);
        }
    }
    best.1
}

/// Fields in one line under a candidate delimiter; quotes respected.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::Open(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| IoError::Read(e.to_string()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sniff_common_delimiters() {
        assert_eq!(sniff_delimiter("Name,Age\nAlice,30\n"), b',');
        assert_eq!(sniff_delimiter("Name;Age\nAlice;30\n"), b';');
        assert_eq!(sniff_delimiter("Name\tAge\nAlice\t30\n"), b'\t');
        assert_eq!(sniff_delimiter("Name|Age\nAlice|30\n"), b'|');
    }

    #[test]
    fn sniff_semicolon_with_quoted_commas() {
        let content = "Name;Address\n\"Doe, Jane\";\"123 Main St, Apt 4\"\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn columns_read_back_in_order() {
        let content = "Date,Amount,Memo\n1/1/2023,$100.00,rent\n1/2/2023,$50.00,\n";
        let source = CsvSource::from_string("txns".into(), content, b',').unwrap();

        assert_eq!(source.tables(), vec!["txns"]);
        assert_eq!(
            source.list_columns("txns").unwrap(),
            vec!["Date", "Amount", "Memo"]
        );

        let memo = source.read_column("txns", "Memo").unwrap();
        assert_eq!(memo, vec![RawCell::Text("rent".into()), RawCell::Empty]);
    }

    #[test]
    fn ragged_rows_pad_with_empty() {
        let content = "A,B,C\n1,2\n4,5,6\n";
        let source = CsvSource::from_string("t".into(), content, b',').unwrap();
        let c = source.read_column("t", "C").unwrap();
        assert_eq!(c, vec![RawCell::Empty, RawCell::Text("6".into())]);
    }

    #[test]
    fn windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Café" in Windows-1252: é = 0xE9
        fs::write(&path, b"Name,City\nRen\xE9,Montr\xE9al\n").unwrap();

        let source = CsvSource::open(&path).unwrap();
        let names = source.read_column("latin", "Name").unwrap();
        assert_eq!(names, vec![RawCell::Text("René".into())]);
    }

    #[test]
    fn open_sniffs_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("semi.csv");
        fs::write(&path, "Name;Amount\nAlice;10\nBob;20\n").unwrap();

        let source = CsvSource::open(&path).unwrap();
        let amounts = source.read_column("semi", "Amount").unwrap();
        assert_eq!(amounts.len(), 2);
    }
}
