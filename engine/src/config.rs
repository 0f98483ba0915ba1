//! CSV processing configuration.
//!
//! Defaults match the export format: comma-delimited, `;`-separated
//! multi-value cells, five schema differences listed before truncation.
//! Values can be overridden from the process environment. Loading a `.env`
//! file is left to the binary, before `from_env` is called:
//!
//! - `FORMKIT_CSV_DELIMITER` - single ASCII character
//! - `FORMKIT_MULTI_VALUE_SEPARATOR` - single character
//! - `FORMKIT_SCHEMA_DIFF_LIMIT` - positive integer

use std::env;

use tracing::warn;

/// Literal cell value meaning "hidden by conditional logic at export time".
pub const NULL_SENTINEL: &str = "null";

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Default separator between selected values of a multi-value cell.
pub const DEFAULT_MULTI_VALUE_SEPARATOR: char = ';';

/// Default number of schema column differences listed in a combine error.
pub const DEFAULT_SCHEMA_DIFF_LIMIT: usize = 5;

/// Options shared by the parser, validator and combiner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub multi_value_separator: char,
    pub schema_diff_limit: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            multi_value_separator: DEFAULT_MULTI_VALUE_SEPARATOR,
            schema_diff_limit: DEFAULT_SCHEMA_DIFF_LIMIT,
        }
    }
}

impl CsvOptions {
    /// Defaults overridden by `FORMKIT_*` environment variables.
    ///
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `FORMKIT_*` key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(raw) = lookup("FORMKIT_CSV_DELIMITER") {
            match raw.as_bytes() {
                [b] if b.is_ascii() => options.delimiter = *b,
                _ => warn!(value = %raw, "ignoring FORMKIT_CSV_DELIMITER: expected one ASCII character"),
            }
        }

        if let Some(raw) = lookup("FORMKIT_MULTI_VALUE_SEPARATOR") {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => options.multi_value_separator = c,
                _ => warn!(value = %raw, "ignoring FORMKIT_MULTI_VALUE_SEPARATOR: expected one character"),
            }
        }

        if let Some(raw) = lookup("FORMKIT_SCHEMA_DIFF_LIMIT") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => options.schema_diff_limit = n,
                _ => warn!(value = %raw, "ignoring FORMKIT_SCHEMA_DIFF_LIMIT: expected a positive integer"),
            }
        }

        options
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the multi-value separator
    pub fn with_multi_value_separator(mut self, separator: char) -> Self {
        self.multi_value_separator = separator;
        self
    }

    /// Set how many schema differences a combine error lists
    pub fn with_schema_diff_limit(mut self, limit: usize) -> Self {
        self.schema_diff_limit = limit;
        self
    }
}
