//! CSV serialization using the csv crate
//!
//! A field is quoted only when it contains the delimiter, the quote character
//! or a line break; embedded quotes are doubled.

use serde::{Deserialize, Serialize};

use super::{CsvError, DELIMITER, QUOTE};

/// Byte order mark, dropped by the reader when it leads the input
const BOM: char = '\u{feff}';

/// Record terminator written between records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\r\n` on Windows, `\n` elsewhere
    #[default]
    Platform,
    Lf,
    CrLf,
}

impl LineEnding {
    /// Resolve `Platform` to the concrete terminator for this build target
    pub fn resolve(self) -> Self {
        match self {
            LineEnding::Platform if cfg!(windows) => LineEnding::CrLf,
            LineEnding::Platform => LineEnding::Lf,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.resolve() {
            LineEnding::CrLf => "\r\n",
            _ => "\n",
        }
    }

    fn terminator(self) -> csv::Terminator {
        match self.resolve() {
            LineEnding::CrLf => csv::Terminator::CRLF,
            _ => csv::Terminator::Any(b'\n'),
        }
    }
}

/// Encode a header and rows using the platform line ending
pub fn encode(header: &[String], rows: &[Vec<String>]) -> Result<String, CsvError> {
    encode_with(header, rows, LineEnding::Platform)
}

/// Encode a header and rows with an explicit line ending
///
/// Every row must have as many fields as the header. A record made of a
/// single empty field is written as `""` so that it is not read back as a
/// blank line. A header whose first field starts with U+FEFF is fully quoted,
/// since a reader strips a byte order mark at the very start of the input.
/// A zero-column table encodes to the empty string and cannot carry rows.
pub fn encode_with(
    header: &[String],
    rows: &[Vec<String>],
    line_ending: LineEnding,
) -> Result<String, CsvError> {
    if header.is_empty() {
        if !rows.is_empty() {
            return Err(CsvError::MissingHeader { rows: rows.len() });
        }
        return Ok(String::new());
    }

    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != header.len())
    {
        return Err(CsvError::RaggedRow {
            line: index as u64 + 2,
            expected: header.len(),
            found: row.len(),
        });
    }

    let header_style = if header[0].starts_with(BOM) {
        csv::QuoteStyle::Always
    } else {
        csv::QuoteStyle::Necessary
    };

    let mut writer = builder(header_style, line_ending).from_writer(Vec::new());
    writer
        .write_record(header)
        .map_err(|e| convert_error(e, 1))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Write(e.to_string()))?;

    let mut writer = builder(csv::QuoteStyle::Necessary, line_ending).from_writer(bytes);
    for (index, row) in rows.iter().enumerate() {
        writer
            .write_record(row)
            .map_err(|e| convert_error(e, index as u64 + 2))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Write(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| CsvError::Write(e.to_string()))
}

fn builder(style: csv::QuoteStyle, line_ending: LineEnding) -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .double_quote(true)
        .quote_style(style)
        .terminator(line_ending.terminator())
        .flexible(false);
    builder
}

fn convert_error(err: csv::Error, line: u64) -> CsvError {
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => CsvError::RaggedRow {
            line,
            expected: *expected_len as usize,
            found: *len as usize,
        },
        _ => CsvError::Write(err.to_string()),
    }
}
