//! Error types for the formkit engine.
//!
//! This module defines one error type per concern:
//!
//! - [`CsvError`] - CSV decoding and parsing errors
//! - [`CombineError`] - Errors while merging several CSV exports
//! - [`TemplateError`] - Errors loading templates or form data
//! - [`CliError`] - Top-level errors surfaced by the `formkit` binary
//!
//! Condition evaluation and schema validation never fail: they return
//! booleans and [`crate::CsvValidationResult`] values instead.
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV decoding and parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the raw bytes.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// The tokenizer could not complete.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Failed to serialize rows back to CSV text.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),

    /// Header and/or schema row missing.
    #[error("CSV must have at least header and schema rows (found {found} non-empty row(s))")]
    MissingRows { found: usize },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => CsvError::ParseError(format!("line {}: {}", pos.line(), err)),
            None => CsvError::ParseError(err.to_string()),
        }
    }
}

// =============================================================================
// Combine Errors
// =============================================================================

/// Errors while combining several CSV files.
///
/// Header and schema mismatches carry a pre-formatted, multi-paragraph report
/// meant to be shown to the user verbatim.
#[derive(Debug, Error)]
pub enum CombineError {
    /// No input at all.
    #[error("No CSV files to combine")]
    NoInput,

    /// One of the inputs could not be parsed.
    #[error("Failed to parse '{file}': {source}")]
    Parse {
        file: String,
        #[source]
        source: CsvError,
    },

    /// Headers differ beyond surrounding whitespace.
    #[error("{report}")]
    HeaderMismatch { file: String, report: String },

    /// Schema rows differ.
    #[error("{report}")]
    SchemaMismatch { file: String, report: String },

    /// Failed to serialize the combined table.
    #[error("Failed to write combined CSV: {0}")]
    Write(String),
}

// =============================================================================
// Template Errors
// =============================================================================

/// Errors while loading templates and form data.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// IO error.
    #[error("Template IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Template JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// CLI Errors (top-level)
// =============================================================================

/// Top-level errors returned by the command line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Combine error.
    #[error("{0}")]
    Combine(#[from] CombineError),

    /// Template error.
    #[error("{0}")]
    Template(#[from] TemplateError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for combine operations.
pub type CombineResult<T> = Result<T, CombineError>;

/// Result type for template loading.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
