//! Merging several two-row schema CSV exports into one.
//!
//! The first input is the reference: every other input must carry the same
//! header row (surrounding whitespace aside) and the same schema row. Data
//! rows are concatenated in input order under the reference header.
//!
//! # Example
//!
//! ```rust,ignore
//! use formkit::combine_csvs;
//!
//! let a = "name,age\ntext,number\nAlice,30";
//! let b = "name ,age\ntext,number\nBob,25";
//! let combined = combine_csvs(&[a, b], None).unwrap();
//! assert_eq!(combined, "name,age\ntext,number\nAlice,30\nBob,25");
//! ```

mod diagnostics;

use tracing::{debug, warn};

use crate::config::CsvOptions;
use crate::error::{CombineError, CombineResult};
use crate::parser::{parse_with_raw_headers, write_rows, ParsedCsv};

use diagnostics::{header_report, schema_report};

/// Combine CSV texts with default options.
///
/// `file_names` label the inputs in diagnostics; unnamed inputs are called
/// `File 1`, `File 2`, ...
pub fn combine_csvs<S: AsRef<str>>(contents: &[S], file_names: Option<&[String]>) -> CombineResult<String> {
    combine_csvs_with(contents, file_names, &CsvOptions::default())
}

/// Combine CSV texts with explicit options.
pub fn combine_csvs_with<S: AsRef<str>>(
    contents: &[S],
    file_names: Option<&[String]>,
    options: &CsvOptions,
) -> CombineResult<String> {
    if contents.is_empty() {
        return Err(CombineError::NoInput);
    }

    let name_of = |i: usize| {
        file_names
            .and_then(|names| names.get(i))
            .cloned()
            .unwrap_or_else(|| format!("File {}", i + 1))
    };

    let mut reference: Option<(String, Vec<String>, ParsedCsv)> = None;
    let mut data: Vec<Vec<String>> = Vec::new();

    for (i, content) in contents.iter().enumerate() {
        let file = name_of(i);
        let (raw_headers, table) = parse_with_raw_headers(content.as_ref(), options)
            .map_err(|source| CombineError::Parse { file: file.clone(), source })?;

        match &reference {
            None => {
                debug!(file = %file, columns = table.column_count(), "using as combine reference");
            }
            Some((reference_name, reference_raw, reference_table)) => {
                if raw_headers != *reference_raw {
                    if table.headers == reference_table.headers {
                        warn!(
                            file = %file,
                            reference = %reference_name,
                            "headers differ only by surrounding whitespace, combining anyway"
                        );
                    } else {
                        return Err(CombineError::HeaderMismatch {
                            report: header_report(reference_name, &reference_table.headers, &file, &table.headers),
                            file,
                        });
                    }
                }

                if table.schema != reference_table.schema {
                    return Err(CombineError::SchemaMismatch {
                        report: schema_report(
                            reference_name,
                            &reference_table.headers,
                            &reference_table.schema,
                            &file,
                            &table.schema,
                            options.schema_diff_limit,
                        ),
                        file,
                    });
                }
            }
        }

        data.extend(table.data.iter().cloned());
        if reference.is_none() {
            reference = Some((file, raw_headers, table));
        }
    }

    let Some((_, _, reference_table)) = reference else {
        return Err(CombineError::NoInput);
    };

    debug!(files = contents.len(), rows = data.len(), "combined csv files");

    let rows = std::iter::once(&reference_table.headers)
        .chain(std::iter::once(&reference_table.schema))
        .chain(data.iter());
    write_rows(rows, options.delimiter).map_err(|e| CombineError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_table;

    #[test]
    fn test_combines_in_order() {
        let a = "name,age\ntext,number\nAlice,30";
        let b = "name,age\ntext,number\nBob,25\nCara,41";
        let combined = combine_csvs(&[a, b], None).unwrap();
        assert_eq!(combined, "name,age\ntext,number\nAlice,30\nBob,25\nCara,41");
    }

    #[test]
    fn test_whitespace_only_header_difference_is_forgiven() {
        let a = "name,age\ntext,number\nAlice,30\nBob,25";
        let b = "name ,age  \ntext,number\nCara,41";
        let combined = combine_csvs(&[a, b], None).unwrap();
        let table = parse_table(&combined).unwrap();
        assert_eq!(table.headers, vec!["name", "age"]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_hard_mismatch_lists_missing_and_extra() {
        let a = "name,age\ntext,number\nAlice,30";
        let b = "name,city\ntext,text\nBob,Paris";
        let names = vec!["first.csv".to_string(), "second.csv".to_string()];
        let err = combine_csvs(&[a, b], Some(names.as_slice())).unwrap_err();

        assert!(matches!(&err, CombineError::HeaderMismatch { file, .. } if file == "second.csv"));
        let msg = err.to_string();
        assert!(msg.contains("Missing headers"));
        assert!(msg.contains("\"age\""));
        assert!(msg.contains("Extra headers"));
        assert!(msg.contains("\"city\""));
    }

    #[test]
    fn test_schema_mismatch() {
        let a = "name,age\ntext,number\nAlice,30";
        let b = "name,age\ntext|required,number\nBob,25";
        let err = combine_csvs(&[a, b], None).unwrap_err();
        assert!(matches!(&err, CombineError::SchemaMismatch { file, .. } if file == "File 2"));
        assert!(err.to_string().contains("name: expected \"text\", found \"text|required\""));
    }

    #[test]
    fn test_empty_input() {
        let none: [&str; 0] = [];
        assert!(matches!(combine_csvs(&none, None), Err(CombineError::NoInput)));
    }

    #[test]
    fn test_parse_failure_names_file() {
        let err = combine_csvs(&["a\ntext\n1", "only-header"], None).unwrap_err();
        assert!(matches!(&err, CombineError::Parse { file, .. } if file == "File 2"));
    }

    #[test]
    fn test_output_requotes_fields() {
        let a = "note\ntextarea\n\"line1\nline2\"";
        let b = "note\ntextarea\n\"a, \"\"b\"\"\"";
        let combined = combine_csvs(&[a, b], None).unwrap();
        assert_eq!(combined, "note\ntextarea\n\"line1\nline2\"\n\"a, \"\"b\"\"\"");
    }

    #[test]
    fn test_single_input_round_trips() {
        let a = "name\ntext\nAlice";
        assert_eq!(combine_csvs(&[a], None).unwrap(), a);
    }
}
