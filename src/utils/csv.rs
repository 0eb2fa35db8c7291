//! Minimal CSV support for the pipeline's tabular files.
//!
//! Fields are quoted only when they contain the delimiter, a quote or a line
//! break; quotes inside quoted fields are doubled.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("File has no header row")]
    MissingHeader,
}

/// Escape a string for CSV output.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write one record followed by a newline.
pub fn write_record<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_csv(f))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{}", line)
}

/// Parse CSV content into records. Handles quoted fields spanning lines and
/// CRLF line endings. A trailing newline does not produce an empty record.
pub fn parse_csv(content: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote(quote_line));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// A CSV file with a header row.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(content: &str) -> Result<Self, CsvError> {
        let mut records = parse_csv(content)?.into_iter();
        let header = records.next().ok_or(CsvError::MissingHeader)?;
        Ok(Self {
            header,
            rows: records.collect(),
        })
    }

    pub fn read(path: &Path) -> Result<Self, CsvError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a named column.
    pub fn column(&self, name: &str) -> Result<usize, CsvError> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CsvError::MissingColumn(name.to_string()))
    }

    /// Values of a named column; short rows yield empty strings.
    pub fn values<'a>(&'a self, name: &str) -> Result<impl Iterator<Item = &'a str> + 'a, CsvError> {
        let index = self.column(name)?;
        Ok(self
            .rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or("")))
    }
}
