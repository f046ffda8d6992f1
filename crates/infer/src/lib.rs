//! `ledgerlens-infer` — Format-inference and value-normalization engine.
//!
//! Pure engine crate: receives raw column values, returns type verdicts and
//! canonical amounts/dates. No CLI or IO dependencies. Per-value failures
//! are normal results (`None` / confidence 0.0), never errors; the worst
//! outcome for any single value is "String with low confidence" or
//! "unparseable", never a halted batch.

pub mod amount;
pub mod classify;
pub mod config;
pub mod date;
pub mod error;
pub mod model;

pub use amount::{parse_amount, parse_amount_str};
pub use classify::ColumnTypeClassifier;
pub use config::ClassifierConfig;
pub use date::{parse_date, parse_date_str};
pub use error::InferError;
pub use model::{ColumnType, FormatHint, RawCell, StringSubtype, TypeVerdict};
