//! Shared utility functions.
//!
//! - `csv`: delimited file reading and writing for catalog and statement tables

pub mod csv;

pub use csv::{escape_csv, parse_csv, CsvError, CsvTable};
