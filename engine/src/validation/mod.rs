//! Schema validation for two-row schema CSV files.
//!
//! Each data cell is checked against the schema cell of its column:
//!
//! - Type checks for `system|identifier`, `system|datetime`, `system|number`,
//!   `email`, `date` and `tel` produce **warnings**
//! - Empty `required` cells produce **errors**
//! - Values outside `options:` produce **warnings**
//!
//! The literal `null` marks a field hidden by conditional logic at export
//! time. It is never treated as empty or out of options, but typed columns
//! still check its format.
//!
//! Validation never fails: parse problems become a single-error result.
//!
//! # Example
//!
//! ```rust,ignore
//! use formkit::validate_csv;
//!
//! let result = validate_csv("email\nemail|required\nnot-an-email\n");
//! assert!(result.is_valid);
//! assert_eq!(result.warnings.len(), 1);
//! ```

pub mod rules;

pub use rules::SchemaRule;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CsvOptions, NULL_SENTINEL};
use crate::parser::parse_table_with;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").expect("Invalid UUID regex")
});
static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{3})?Z?$").expect("Invalid datetime regex")
});
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("Invalid number regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid email regex")
});
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));
// Lenient: digits, separators, `+`, `#` and "ext" extensions
static TEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[+0-9\-() .,ext#]+$").expect("Invalid phone regex"));

/// Outcome of validating one CSV document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvValidationResult {
    /// `true` when `errors` is empty. Warnings never affect validity.
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub column_count: usize,
    pub row_count: usize,
}

impl CsvValidationResult {
    fn failed(message: String) -> Self {
        Self {
            is_valid: false,
            errors: vec![message],
            ..Default::default()
        }
    }
}

/// Validate CSV text with default options.
pub fn validate_csv(content: &str) -> CsvValidationResult {
    validate_csv_with(content, &CsvOptions::default())
}

/// Validate CSV text with explicit options.
pub fn validate_csv_with(content: &str, options: &CsvOptions) -> CsvValidationResult {
    let table = match parse_table_with(content, options) {
        Ok(table) => table,
        Err(e) => return CsvValidationResult::failed(e.to_string()),
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if table.headers.len() != table.schema.len() {
        errors.push(format!(
            "Header columns ({}) don't match schema columns ({})",
            table.headers.len(),
            table.schema.len()
        ));
    }

    let rules: Vec<SchemaRule> = table.schema.iter().map(|cell| SchemaRule::parse(cell)).collect();

    for (index, row) in table.data.iter().enumerate() {
        // Rows 1 and 2 are headers and schema
        let line = index + 3;

        if row.len() != table.headers.len() {
            errors.push(format!(
                "Row {} has {} fields, expected {}",
                line,
                row.len(),
                table.headers.len()
            ));
            continue;
        }

        for ((value, name), rule) in row.iter().zip(&table.headers).zip(&rules) {
            let mut cell = CellCheck {
                line,
                name,
                errors: &mut errors,
                warnings: &mut warnings,
            };
            cell.check(value, rule, options.multi_value_separator);
        }
    }

    debug!(
        columns = table.column_count(),
        rows = table.row_count(),
        errors = errors.len(),
        warnings = warnings.len(),
        "validated csv"
    );

    CsvValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        column_count: table.column_count(),
        row_count: table.row_count(),
    }
}

struct CellCheck<'a> {
    line: usize,
    name: &'a str,
    errors: &'a mut Vec<String>,
    warnings: &'a mut Vec<String>,
}

impl CellCheck<'_> {
    fn check(&mut self, value: &str, rule: &SchemaRule, separator: char) {
        if value.is_empty() {
            if rule.is_required() {
                self.error("Required field is empty");
            }
            return;
        }

        if let Some((pattern, label)) = type_check(&rule.type_tag) {
            if !pattern.is_match(value) {
                self.warn(&format!("Invalid {} format", label));
            }
        }

        if value == NULL_SENTINEL {
            return;
        }

        if let Some(options) = &rule.options {
            if rule.is_multiple() {
                for part in value.split(separator).map(str::trim) {
                    if !part.is_empty() && part != NULL_SENTINEL && !options.iter().any(|o| o == part) {
                        self.warn(&format!("Value '{}' not in allowed options", part));
                    }
                }
            } else if !options.iter().any(|o| o == value) {
                self.warn(&format!("Value '{}' not in allowed options", value));
            }
        }
    }

    fn error(&mut self, message: &str) {
        self.errors
            .push(format!("Line {}, field '{}': {}", self.line, self.name, message));
    }

    fn warn(&mut self, message: &str) {
        self.warnings
            .push(format!("Line {}, field '{}': {}", self.line, self.name, message));
    }
}

pub(crate) fn type_check(type_tag: &str) -> Option<(&'static Regex, &'static str)> {
    match type_tag {
        "system|identifier" => Some((&*UUID_RE, "UUID")),
        "system|datetime" => Some((&*DATETIME_RE, "datetime")),
        "system|number" => Some((&*NUMBER_RE, "number")),
        "email" => Some((&*EMAIL_RE, "email")),
        "date" => Some((&*DATE_RE, "date")),
        "tel" => Some((&*TEL_RE, "phone")),
        _ => None,
    }
}
