//! # Formkit - conditional form logic and two-row schema CSV processing
//!
//! Formkit evaluates visibility conditions over user-entered form data and
//! processes the self-describing CSV format used to export, validate and merge
//! form records.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Template   │────▶│ Visibility  │────▶│  Progress & │────▶│   Export    │
//! │ + FormData  │     │ (conditions)│     │  Nullify    │     │ (2-row CSV) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │  Validate   │◀────│   Parser    │◀───────────┘
//!                     │  / Combine  │     │ (RFC 4180)  │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formkit::{calculate_progress, update_conditional_fields_as_null, validate_csv, Template};
//!
//! let template = Template::from_file("survey.json")?;
//! let data = formkit::load_form_data("answers.json")?;
//!
//! let percent = calculate_progress(&template.sections, &data, &["about"], &[] as &[&str]);
//! let cleaned = update_conditional_fields_as_null(&template.sections, &data);
//!
//! let result = validate_csv(&std::fs::read_to_string("export.csv")?);
//! println!("{}% done, csv valid: {}", percent, result.is_valid);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`models`] - Templates, conditions and form values
//! - [`config`] - CSV options and environment overrides
//! - [`logic`] - Condition evaluation, visibility, progress, nullification
//! - [`parser`] - Two-row schema CSV parsing with encoding detection
//! - [`validation`] - Schema-driven row validation
//! - [`combine`] - Merging CSV exports with mismatch diagnostics
//! - [`export`] - Writing form records as two-row schema CSV
//! - [`integrity`] - Checking an export against its template and source data

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Conditional logic
pub mod logic;

// CSV processing
pub mod combine;
pub mod export;
pub mod integrity;
pub mod parser;
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CliError, CliResult, CombineError, CombineResult, CsvError, CsvResult, TemplateError, TemplateResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    load_form_data, CompoundCondition, Condition, Field, FieldType, FieldValidation, FormData, FormValue, Logic,
    Operator, Section, SingleCondition, Template,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{CsvOptions, NULL_SENTINEL};

// =============================================================================
// Re-exports - Conditional logic
// =============================================================================

pub use logic::{
    calculate_progress, evaluate, evaluate_compound, evaluate_single, field_key, is_visible, parse_field_key,
    resolve, update_conditional_fields_as_null, validate_field, visible_fields, visible_sections,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_bytes, decode_content, detect_encoding, parse_file, parse_table, parse_table_with, write_rows,
    ParsedCsv,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_csv, validate_csv_with, CsvValidationResult, SchemaRule};

// =============================================================================
// Re-exports - Combine / Export / Integrity
// =============================================================================

pub use combine::{combine_csvs, combine_csvs_with};
pub use export::{export_records, schema_cell, ExportRecord, RecordStatus};
pub use integrity::{check_integrity, CsvIntegrityResult, IntegrityIssue};
