// ledgerlens - financial table type inference and normalization

mod normalize;
mod where_expr;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ledgerlens_infer::ClassifierConfig;
use ledgerlens_io::{CsvSource, IoError, TableSource, WorkbookSource};
use ledgerlens_store::{AggFn, Predicate, Table};

use normalize::{classify_table, normalize_table};
use where_expr::parse_where;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_IO: u8 = 3;
pub const EXIT_PARSE: u8 = 4;

#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(about = "Infer column types and normalize messy financial tables")]
#[command(version)]
struct Cli {
    /// Classifier config file (TOML); defaults apply when omitted
    #[arg(long, global = true, env = "LEDGERLENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables (sheets) in a file
    Sheets {
        /// Input file (.xlsx, .xls, .xlsb, .ods, .csv, .tsv)
        input: PathBuf,
    },

    /// Classify each column of a table and report type verdicts
    #[command(after_help = "\
Examples:
  ledgerlens classify ledger.xlsx
  ledgerlens classify ledger.xlsx --table Q3
  ledgerlens classify txns.csv --json")]
    Classify {
        input: PathBuf,

        /// Table (sheet) name; defaults to the first table
        #[arg(long)]
        table: Option<String>,

        /// Emit verdicts as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Normalize a table to canonical values (ISO dates, plain decimals)
    #[command(after_help = "\
Examples:
  ledgerlens normalize ledger.xlsx -o clean.csv
  ledgerlens normalize txns.csv --json")]
    Normalize {
        input: PathBuf,

        #[arg(long)]
        table: Option<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Emit JSON (columns with verdicts) instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Group and aggregate a normalized table
    #[command(after_help = "\
Examples:
  ledgerlens aggregate txns.csv --group-by Category --measure Amount
  ledgerlens aggregate txns.csv --group-by Category --measure Amount --agg avg
  ledgerlens aggregate txns.csv --group-by Category --measure Amount \\
      --where 'Amount<0' --where 'Category!=Transfers'")]
    Aggregate {
        input: PathBuf,

        #[arg(long)]
        table: Option<String>,

        /// Column(s) to group by. Repeatable.
        #[arg(long = "group-by", value_name = "COLUMN", required = true)]
        group_by: Vec<String>,

        /// Measure column(s) to aggregate. Repeatable.
        #[arg(long = "measure", value_name = "COLUMN", required = true)]
        measures: Vec<String>,

        /// Aggregate function: sum, count, avg, min, max
        #[arg(long, default_value = "sum")]
        agg: AggFn,

        /// Filter rows before aggregating. Repeatable.
        /// Examples: 'Category=Rent', 'Amount<0', 'Description~invoice'
        #[arg(long = "where", value_name = "EXPR")]
        filters: Vec<String>,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Sheets { input } => cmd_sheets(&input),
        Commands::Classify { input, table, json } => cmd_classify(&input, table, json, &config),
        Commands::Normalize {
            input,
            table,
            output,
            json,
        } => cmd_normalize(&input, table, output, json, &config),
        Commands::Aggregate {
            input,
            table,
            group_by,
            measures,
            agg,
            filters,
            json,
        } => cmd_aggregate(&input, table, &group_by, &measures, agg, &filters, json, &config),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_sheets(input: &Path) -> Result<(), CliError> {
    let source = open_source(input)?;
    for info in ledgerlens_io::describe(source.as_ref()).map_err(CliError::from_io)? {
        println!(
            "{:<24} {:>6} rows  {}",
            info.name,
            info.rows,
            info.columns.join(", ")
        );
    }
    Ok(())
}

fn cmd_classify(
    input: &Path,
    table: Option<String>,
    json: bool,
    config: &ClassifierConfig,
) -> Result<(), CliError> {
    let source = open_source(input)?;
    let table = resolve_table(source.as_ref(), table)?;
    let verdicts = classify_table(source.as_ref(), &table, config)?;

    if json {
        let out = serde_json::to_string_pretty(&verdicts)
            .map_err(|e| CliError::parse(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    for cv in &verdicts {
        let v = &cv.verdict;
        let mut line = format!(
            "{:<24} {:<8} confidence {:.2}",
            cv.name, v.column_type, v.confidence
        );
        if let Some(sub) = v.string_subtype {
            line.push_str(&format!("  subtype {sub}"));
        }
        if let Some(fmt) = v.format {
            line.push_str(&format!("  format {fmt:?}"));
        }
        println!("{line}");
    }
    Ok(())
}

fn cmd_normalize(
    input: &Path,
    table: Option<String>,
    output: Option<PathBuf>,
    json: bool,
    config: &ClassifierConfig,
) -> Result<(), CliError> {
    let source = open_source(input)?;
    let table = resolve_table(source.as_ref(), table)?;
    let normalized = normalize_table(source.as_ref(), &table, config)?;

    if json {
        let out = serde_json::to_string_pretty(&normalized)
            .map_err(|e| CliError::parse(e.to_string()))?;
        write_output(output.as_deref(), out.as_bytes())
    } else {
        let bytes = table_to_csv(&normalized)?;
        write_output(output.as_deref(), &bytes)
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_aggregate(
    input: &Path,
    table: Option<String>,
    group_by: &[String],
    measures: &[String],
    agg: AggFn,
    filters: &[String],
    json: bool,
    config: &ClassifierConfig,
) -> Result<(), CliError> {
    let source = open_source(input)?;
    let table = resolve_table(source.as_ref(), table)?;
    let normalized = normalize_table(source.as_ref(), &table, config)?;

    let predicates: Vec<Predicate> = filters
        .iter()
        .map(|expr| parse_where(expr))
        .collect::<Result<_, _>>()?;

    let filtered = if predicates.is_empty() {
        normalized
    } else {
        normalized
            .filter(&predicates)
            .map_err(|e| CliError::args(e.to_string()))?
    };

    let group_refs: Vec<&str> = group_by.iter().map(String::as_str).collect();
    let measure_refs: Vec<&str> = measures.iter().map(String::as_str).collect();
    let result = filtered
        .aggregate(&group_refs, &measure_refs, agg)
        .map_err(|e| CliError::args(e.to_string()))?;

    if json {
        let out = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::parse(e.to_string()))?;
        println!("{out}");
        Ok(())
    } else {
        let bytes = table_to_csv(&result)?;
        io::stdout()
            .write_all(&bytes)
            .map_err(|e| CliError::io(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<ClassifierConfig, CliError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::io(format!("cannot read {}: {e}", path.display()))
            })?;
            ClassifierConfig::from_toml(&text).map_err(|e| CliError::parse(e.to_string()))
        }
        None => Ok(ClassifierConfig::default()),
    }
}

/// Pick a source implementation from the file extension. Anything that is
/// not a spreadsheet extension is treated as delimited text.
fn open_source(path: &Path) -> Result<Box<dyn TableSource>, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xls" | "xlsb" | "ods" => {
            let source = WorkbookSource::open(path).map_err(CliError::from_io)?;
            Ok(Box::new(source))
        }
        _ => {
            let source = CsvSource::open(path).map_err(CliError::from_io)?;
            Ok(Box::new(source))
        }
    }
}

fn resolve_table(source: &dyn TableSource, requested: Option<String>) -> Result<String, CliError> {
    let tables = source.tables();
    match requested {
        Some(name) => {
            if tables.contains(&name) {
                Ok(name)
            } else {
                Err(CliError {
                    code: EXIT_USAGE,
                    message: format!("no table named '{name}'"),
                    hint: Some(format!("available tables: {}", tables.join(", "))),
                })
            }
        }
        None => tables
            .into_iter()
            .next()
            .ok_or_else(|| CliError::io("file contains no tables".to_string())),
    }
}

/// Render a normalized table as CSV: header row, then canonical value text.
fn table_to_csv(table: &Table) -> Result<Vec<u8>, CliError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let headers: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    writer
        .write_record(&headers)
        .map_err(|e| CliError::io(e.to_string()))?;

    for row in 0..table.rows() {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|c| c.values[row].to_string())
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| CliError::io(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CliError::io(e.to_string()))
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match output {
        Some(path) => {
            let mut file = File::create(path).map_err(|e| {
                CliError::io(format!("cannot write {}: {e}", path.display()))
            })?;
            file.write_all(bytes)
                .map_err(|e| CliError::io(e.to_string()))
        }
        None => io::stdout()
            .write_all(bytes)
            .map_err(|e| CliError::io(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn from_io(err: IoError) -> Self {
        match &err {
            IoError::TableNotFound(_) | IoError::ColumnNotFound { .. } => {
                Self::args(err.to_string())
            }
            IoError::Open(_) | IoError::Read(_) => Self::io(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_store::Value;

    #[test]
    fn spreadsheet_extensions_route_to_workbook() {
        // Both paths fail on a missing file; only the routing is under test.
        let err = open_source(Path::new("/nonexistent/ledger.xlsx"))
            .err()
            .unwrap();
        assert_eq!(err.code, EXIT_IO);
        let err = open_source(Path::new("/nonexistent/ledger.csv"))
            .err()
            .unwrap();
        assert_eq!(err.code, EXIT_IO);
    }

    #[test]
    fn csv_rendering_uses_canonical_text() {
        use chrono::NaiveDate;
        use ledgerlens_store::Column;
        use rust_decimal::Decimal;
        use std::str::FromStr;

        let table = Table {
            columns: vec![
                Column {
                    name: "Date".into(),
                    verdict: None,
                    values: vec![Value::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())],
                },
                Column {
                    name: "Amount".into(),
                    verdict: None,
                    values: vec![Value::Amount(Decimal::from_str("-1200.00").unwrap())],
                },
            ],
        };
        let bytes = table_to_csv(&table).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Date,Amount\n2023-01-15,-1200.00\n");
    }
}
