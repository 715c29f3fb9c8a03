//! CSV codec
//!
//! Stateless conversion between CSV text and a header + rows [`Table`].
//!
//! The dialect is fixed: comma delimiter, double-quote quoting with embedded
//! quotes doubled, and the first record is the header. Every value is opaque
//! text, nothing is coerced to numbers or dates.
//!
//! ```text
//! decode(&str) ──► Table { header, rows } ──► encode(header, rows) ──► String
//! ```

mod parser;
mod writer;

use thiserror::Error;

pub use parser::{decode, decode_bytes};
pub use writer::{encode, encode_with, LineEnding};

/// Field delimiter
pub const DELIMITER: u8 = b',';

/// Quoting character
pub const QUOTE: u8 = b'"';

/// Errors produced while reading or writing CSV
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    /// A record's field count differs from the header's
    #[error("CSV parse error at line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    /// A quoted field is still open at end of input
    #[error("CSV parse error at line {line}: unterminated quoted field")]
    UnterminatedQuote { line: u64 },
    /// The input is not valid UTF-8
    #[error("CSV parse error at line {line}: invalid UTF-8")]
    InvalidUtf8 { line: u64 },
    /// Any other reader failure
    #[error("CSV parse error: {0}")]
    Malformed(String),
    /// Rows given alongside an empty header
    #[error("CSV write error: {rows} rows have no header")]
    MissingHeader { rows: usize },
    /// Writer failure
    #[error("CSV write error: {0}")]
    Write(String),
}

/// Decoded CSV content: the header record plus the data records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is neither a header nor any rows (empty input)
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }
}
