//! Two-row schema CSV parsing and serialization.
//!
//! The wire format is: row 1 headers, row 2 schema strings, rows 3+ data.
//! Tokenization is RFC 4180 compliant (quoted delimiters, embedded newlines,
//! `""` escapes) and runs over the whole input, so a multi-line quoted value
//! stays one cell.
//!
//! Raw bytes from files are decoded with encoding auto-detection first.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::config::CsvOptions;
use crate::error::{CsvError, CsvResult};

/// A parsed two-row schema CSV.
///
/// Headers and schema cells are trimmed; data cells are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub schema: Vec<String>,
    pub data: Vec<Vec<String>>,
}

impl ParsedCsv {
    /// Number of header columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Serialize back to CSV text with RFC 4180 quoting.
    pub fn to_csv(&self, options: &CsvOptions) -> CsvResult<String> {
        let rows = std::iter::once(&self.headers)
            .chain(std::iter::once(&self.schema))
            .chain(self.data.iter());
        write_rows(rows, options.delimiter)
    }
}

/// Parse CSV text with default options.
///
/// # Example
/// ```ignore
/// use formkit::parse_table;
///
/// let csv = "Name,Comment\ntext,textarea\nJohn,\"line1\nline2\"";
/// let table = parse_table(csv).unwrap();
///
/// assert_eq!(table.headers, vec!["Name", "Comment"]);
/// assert_eq!(table.data, vec![vec!["John", "line1\nline2"]]);
/// ```
pub fn parse_table(content: &str) -> CsvResult<ParsedCsv> {
    parse_table_with(content, &CsvOptions::default())
}

/// Parse CSV text with explicit options.
///
/// Blank lines are skipped. Fails when fewer than two non-empty rows remain.
pub fn parse_table_with(content: &str, options: &CsvOptions) -> CsvResult<ParsedCsv> {
    parse_with_raw_headers(content, options).map(|(_, table)| table)
}

/// Parse CSV text and also return the header row before trimming.
///
/// Used where surrounding whitespace in headers must be reported rather
/// than silently dropped.
pub fn parse_with_raw_headers(content: &str, options: &CsvOptions) -> CsvResult<(Vec<String>, ParsedCsv)> {
    let rows = tokenize(content, options.delimiter)?;

    if rows.len() < 2 {
        return Err(CsvError::MissingRows { found: rows.len() });
    }

    let mut rows = rows.into_iter();
    let raw_headers = rows.next().unwrap_or_default();
    let headers = trim_cells(&raw_headers);
    let schema = rows.next().map(|row| trim_cells(&row)).unwrap_or_default();
    let data: Vec<Vec<String>> = rows.collect();

    debug!(columns = headers.len(), rows = data.len(), "parsed schema csv");

    Ok((raw_headers, ParsedCsv { headers, schema, data }))
}

fn trim_cells(row: &[String]) -> Vec<String> {
    row.iter().map(|c| c.trim().to_string()).collect()
}

/// Split CSV text into rows of cells, skipping blank lines.
pub fn tokenize(content: &str, delimiter: u8) -> CsvResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        rows.push(record.iter().map(String::from).collect());
    }
    Ok(rows)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.is_empty() || (record.len() == 1 && record[0].trim().is_empty())
}

/// Serialize rows to CSV text, `\n`-separated without a trailing newline.
///
/// A field is quoted only when it contains the delimiter, a quote or a line
/// break; embedded quotes are doubled.
pub fn write_rows<R, F>(rows: impl IntoIterator<Item = R>, delimiter: u8) -> CsvResult<String>
where
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(row).map_err(|e| CsvError::WriteError(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))?;
    let mut out = String::from_utf8(bytes).map_err(|e| CsvError::EncodingError(e.to_string()))?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

// =============================================================================
// Encoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        // WHATWG maps latin1 labels to windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        // UTF-8 and anything unknown: lossy UTF-8
        _ => encoding_rs::UTF_8.decode(bytes).0.into_owned(),
    };
    decoded.trim_start_matches('\u{feff}').to_string()
}

/// Detect the encoding and decode in one step.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let encoding = detect_encoding(bytes);
    debug!(%encoding, bytes = bytes.len(), "decoding csv input");
    decode_content(bytes, &encoding)
}

/// Read, decode and parse a CSV file.
pub fn parse_file(path: impl AsRef<Path>, options: &CsvOptions) -> CsvResult<ParsedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_table_with(&decode_bytes(&bytes), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_table() {
        let csv = "name,age\ntext,number\nAlice,30\nBob,25";
        let table = parse_table(csv).unwrap();

        assert_eq!(table.headers, vec!["name", "age"]);
        assert_eq!(table.schema, vec!["text", "number"]);
        assert_eq!(table.data, vec![vec!["Alice", "30"], vec!["Bob", "25"]]);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_multiline_quoted_field_is_one_row() {
        let csv = "Name,Comment,Status\ntext,textarea,text\nJohn,\"line1\nline2\nline3\",Active";
        let table = parse_table(csv).unwrap();

        assert_eq!(table.headers, vec!["Name", "Comment", "Status"]);
        assert_eq!(table.data, vec![vec!["John", "line1\nline2\nline3", "Active"]]);
    }

    #[test]
    fn test_quoted_delimiters_and_escaped_quotes() {
        let csv = "a,b\ntext,text\n\"x, y\",\"say \"\"hi\"\"\"";
        let table = parse_table(csv).unwrap();
        assert_eq!(table.data, vec![vec!["x, y", "say \"hi\""]]);
    }

    #[test]
    fn test_headers_trimmed_data_verbatim() {
        let csv = " Name , Notes \n text , textarea \n  padded  ,\"  keep  \"";
        let table = parse_table(csv).unwrap();
        assert_eq!(table.headers, vec!["Name", "Notes"]);
        assert_eq!(table.schema, vec!["text", "textarea"]);
        assert_eq!(table.data, vec![vec!["  padded  ", "  keep  "]]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = "a,b\n\ntext,text\n1,2\n\n   \n3,4\n";
        let table = parse_table(csv).unwrap();
        assert_eq!(table.data.len(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let csv = "a,b\r\ntext,text\r\n1,2\r\n";
        let table = parse_table(csv).unwrap();
        assert_eq!(table.data, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_too_few_rows() {
        assert!(matches!(parse_table(""), Err(CsvError::MissingRows { found: 0 })));
        assert!(matches!(parse_table("a,b\n\n"), Err(CsvError::MissingRows { found: 1 })));
    }

    #[test]
    fn test_header_and_schema_only() {
        let table = parse_table("a,b\ntext,text").unwrap();
        assert!(table.data.is_empty());
    }

    #[test]
    fn test_ragged_rows_kept() {
        let table = parse_table("a,b,c\ntext,text,text\n1,2").unwrap();
        assert_eq!(table.data, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_write_rows_quoting() {
        let rows = vec![
            vec!["plain", "with,comma", "with \"quote\""],
            vec!["multi\nline", "", "end"],
        ];
        let out = write_rows(rows, b',').unwrap();
        assert_eq!(
            out,
            "plain,\"with,comma\",\"with \"\"quote\"\"\"\n\"multi\nline\",,end"
        );
    }

    #[test]
    fn test_to_csv_reparses_identically() {
        let csv = "Name,Comment\ntext,textarea\nJohn,\"a, \"\"b\"\"\nc\"";
        let table = parse_table(csv).unwrap();
        let written = table.to_csv(&CsvOptions::default()).unwrap();
        assert_eq!(parse_table(&written).unwrap(), table);
    }

    #[test]
    fn test_custom_delimiter() {
        let options = CsvOptions::default().with_delimiter(b';');
        let table = parse_table_with("a;b\ntext;text\n1,5;2", &options).unwrap();
        assert_eq!(table.data, vec![vec!["1,5", "2"]]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_currency_sign_not_euro() {
        let bytes: &[u8] = &[0x31, 0x30, 0xA4, 0x20, 0xBC];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "10\u{a4} \u{bc}");
        assert_eq!(decode_content(bytes, "latin1"), "10¤ ¼");
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = "\u{feff}a,b\ntext,text".as_bytes();
        let table = parse_table(&decode_content(bytes, "utf-8")).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
    }
}
