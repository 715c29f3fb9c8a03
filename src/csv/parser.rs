//! CSV parsing using the csv crate
//!
//! RFC 4180 parsing of quoted fields and escaped quotes. The reader is
//! strict about record length: every data record must have exactly as many
//! fields as the header.

use super::{CsvError, Table, DELIMITER, QUOTE};
use std::io::Cursor;

/// Decode CSV text into a header and rows
///
/// An empty input yields an empty table; whether that is acceptable is up to
/// the caller.
pub fn decode(content: &str) -> Result<Table, CsvError> {
    decode_bytes(content.as_bytes())
}

/// Decode raw bytes, reporting invalid UTF-8 as a parse error
pub fn decode_bytes(input: &[u8]) -> Result<Table, CsvError> {
    // The csv reader closes an open quoted field at EOF without complaint
    if let Some(line) = find_unterminated_quote(input) {
        return Err(CsvError::UnterminatedQuote { line });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .double_quote(true)
        .has_headers(false)
        .flexible(false)
        .from_reader(Cursor::new(input));

    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        None => return Ok(Table::default()),
        Some(result) => {
            let record = result.map_err(convert_error)?;
            record.iter().map(|s| s.to_string()).collect()
        }
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in records {
        let record = result.map_err(convert_error)?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    tracing::debug!(
        columns = header.len(),
        rows = rows.len(),
        "decoded CSV table"
    );

    Ok(Table { header, rows })
}

fn convert_error(err: csv::Error) -> CsvError {
    fn line_of(pos: &Option<csv::Position>) -> u64 {
        pos.as_ref().map(|p| p.line()).unwrap_or(0)
    }

    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => CsvError::RaggedRow {
            line: line_of(pos),
            expected: *expected_len as usize,
            found: *len as usize,
        },
        csv::ErrorKind::Utf8 { pos, .. } => CsvError::InvalidUtf8 { line: line_of(pos) },
        _ => CsvError::Malformed(err.to_string()),
    }
}

/// Find a quoted field that is still open at end of input
///
/// Follows the reader's own rules: a quote only opens a quoted field at the
/// start of a field, a doubled quote inside it is an escaped quote, and a
/// quote anywhere else is literal text. Returns the 1-based line of the
/// opening quote.
fn find_unterminated_quote(input: &[u8]) -> Option<u64> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Scan {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut state = Scan::FieldStart;
    let mut line = 1u64;
    let mut opened_at = 1u64;

    for &byte in input {
        state = match (state, byte) {
            (Scan::Quoted, QUOTE) => Scan::QuoteInQuoted,
            (Scan::Quoted, _) => Scan::Quoted,
            (Scan::QuoteInQuoted, QUOTE) => Scan::Quoted,
            (Scan::FieldStart, QUOTE) => {
                opened_at = line;
                Scan::Quoted
            }
            (_, DELIMITER | b'\n' | b'\r') => Scan::FieldStart,
            _ => Scan::Unquoted,
        };
        if byte == b'\n' {
            line += 1;
        }
    }

    (state == Scan::Quoted).then_some(opened_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let table = decode("a,b,c\n1,2,3\n").unwrap();

        assert_eq!(table.header, vec!["a", "b", "c"]);
        assert_eq!(table.rows, vec![vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let content = r#""hello, world","test"
"with ""quotes""","normal"
"#;
        let table = decode(content).unwrap();

        assert_eq!(table.header[0], "hello, world");
        assert_eq!(table.rows[0][0], "with \"quotes\"");
    }

    #[test]
    fn test_parse_embedded_newline() {
        let table = decode("note\n\"two\nlines\"\n").unwrap();
        assert_eq!(table.rows, vec![vec!["two\nlines"]]);
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let table = decode("a,b\n1,2").unwrap();
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_parse_crlf_terminators() {
        let table = decode("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_values_are_not_coerced() {
        let table = decode("n,d\n007,2021-10-15\n").unwrap();
        assert_eq!(table.rows[0], vec!["007", "2021-10-15"]);
    }

    #[test]
    fn test_parse_ragged_row_fails() {
        let err = decode("a,b,c\n1,2,3\n4,5\n").unwrap_err();
        assert!(matches!(
            err,
            CsvError::RaggedRow {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_long_row_fails() {
        let err = decode("a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(
            err,
            CsvError::RaggedRow {
                line: 2,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_unterminated_quote_fails() {
        let err = decode("a,b\n1,\"open\n2,3\n").unwrap_err();
        assert_eq!(err, CsvError::UnterminatedQuote { line: 2 });
    }

    #[test]
    fn test_literal_quote_mid_field_is_not_unterminated() {
        let table = decode("a,b\n5\"3,x\n").unwrap();
        assert_eq!(table.rows[0], vec!["5\"3", "x"]);
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let err = decode_bytes(b"a,b\n\xff,1\n").unwrap_err();
        assert!(matches!(err, CsvError::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_parse_empty() {
        let table = decode("").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_header_only() {
        let table = decode("a,b\n").unwrap();
        assert_eq!(table.header, vec!["a", "b"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_parse_single_column() {
        let table = decode("a\nb\nc\n").unwrap();

        assert_eq!(table.column_count(), 1);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_scan_escaped_quotes_close_properly() {
        assert_eq!(find_unterminated_quote(b"\"a\"\"b\",c\n"), None);
        assert_eq!(find_unterminated_quote(b"\"a\"\"\n"), Some(1));
        assert_eq!(find_unterminated_quote(b"x\n\n\"y"), Some(3));
    }
}
