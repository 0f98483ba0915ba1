//! Integrity check of an exported CSV against its template and source data.
//!
//! The report has three parts, each scored 0-100:
//!
//! - **Completeness**: system and template columns present, unknown columns
//! - **Accuracy**: cell types, field constraints, agreement with the form data
//! - **Integrity**: exactly one well-formed record, hidden fields exported as `null`
//!
//! The overall score weights them 30/40/30. An export is valid when the
//! overall score reaches [`PASSING_SCORE`] with no missing columns, no type
//! errors and no value discrepancies.
//!
//! # Example
//!
//! ```rust,ignore
//! use formkit::{check_integrity, export_records, ExportRecord};
//!
//! let csv = export_records(&template, &[ExportRecord::submitted(data.clone())], false)?;
//! let report = check_integrity(&template, &data, &csv);
//! assert!(report.is_valid);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::NULL_SENTINEL;
use crate::export::{cell_value, SYSTEM_COLUMNS};
use crate::logic::{field_key, resolve, update_conditional_fields_as_null, validate_field};
use crate::models::{Field, FieldType, FormData, FormValue, Template};
use crate::parser::{parse_table, ParsedCsv};
use crate::validation::{type_check, SchemaRule};

/// Minimum overall score of a valid export.
pub const PASSING_SCORE: u8 = 90;

const DATA_TYPE_PENALTY: f64 = 20.0;
const CONSTRAINT_PENALTY: f64 = 15.0;
const DISCREPANCY_PENALTY: f64 = 10.0;
const EXTRA_COLUMN_PENALTY: f64 = 5.0;

/// One problem found in the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityIssue {
    /// Column header, or a label such as `record_count` for file-level issues.
    pub field: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl IntegrityIssue {
    fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
            ..Default::default()
        }
    }

    fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completeness {
    pub expected_field_count: usize,
    pub present_field_count: usize,
    pub missing_fields: Vec<String>,
    pub extra_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accuracy {
    pub data_type_errors: Vec<IntegrityIssue>,
    pub constraint_violations: Vec<IntegrityIssue>,
    pub value_discrepancies: Vec<IntegrityIssue>,
}

impl Accuracy {
    fn penalty(&self) -> f64 {
        self.data_type_errors.len() as f64 * DATA_TYPE_PENALTY
            + self.constraint_violations.len() as f64 * CONSTRAINT_PENALTY
            + self.value_discrepancies.len() as f64 * DISCREPANCY_PENALTY
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIntegrity {
    pub total_records: usize,
    /// Records with the header's column count.
    pub valid_records: usize,
    pub corrupted_records: Vec<IntegrityIssue>,
    /// `false` when a hidden conditional field kept its value in the export.
    pub null_fields_handled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegritySummary {
    pub overall_score: u8,
    pub completeness_score: u8,
    pub accuracy_score: u8,
    pub integrity_score: u8,
}

/// Full integrity report for one exported CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvIntegrityResult {
    pub is_valid: bool,
    pub completeness: Completeness,
    pub accuracy: Accuracy,
    pub integrity: RecordIntegrity,
    pub summary: IntegritySummary,
}

/// Compare `csv`, an export of a single record, with `template` and the
/// `form_data` it was exported from.
///
/// Never fails: a CSV that cannot be parsed yields an invalid report with a
/// `csv_parsing` issue and zero scores.
pub fn check_integrity(template: &Template, form_data: &FormData, csv: &str) -> CsvIntegrityResult {
    let mut result = CsvIntegrityResult::default();

    let table = match parse_table(csv) {
        Ok(table) => table,
        Err(e) => {
            result
                .integrity
                .corrupted_records
                .push(IntegrityIssue::new("csv_parsing", format!("Failed to parse CSV: {}", e)));
            return result;
        }
    };

    let columns: Vec<(String, &Field)> = template
        .sections
        .iter()
        .flat_map(|section| {
            section
                .fields
                .iter()
                .map(move |field| (field_key(&field.id, Some(section.id.as_str())), field))
        })
        .collect();
    let fields: HashMap<&str, &Field> = columns.iter().map(|(key, field)| (key.as_str(), *field)).collect();

    let expected: Vec<String> = SYSTEM_COLUMNS
        .iter()
        .map(|(name, _)| name.to_string())
        .chain(columns.iter().map(|(key, _)| key.clone()))
        .collect();
    let completeness_score = check_completeness(&expected, &table.headers, &mut result.completeness);

    check_schema_row(&fields, &table, &mut result.accuracy);

    // What the exporter writes for each field once hidden fields are nulled
    let exported = update_conditional_fields_as_null(&template.sections, form_data);

    let mut integrity = RecordIntegrity {
        total_records: table.row_count(),
        null_fields_handled: true,
        ..Default::default()
    };

    for (index, row) in table.data.iter().enumerate() {
        let line = index + 3;

        if row.len() != table.headers.len() {
            integrity.corrupted_records.push(
                IntegrityIssue::new(
                    format!("row_{}", line),
                    format!("Row {} has {} fields, expected {}", line, row.len(), table.headers.len()),
                )
                .expected(table.headers.len().to_string())
                .actual(row.len().to_string()),
            );
            continue;
        }
        integrity.valid_records += 1;

        for (header, cell) in table.headers.iter().zip(row) {
            if is_system_column(header) {
                continue;
            }
            let Some(field) = fields.get(header.as_str()) else {
                result
                    .accuracy
                    .data_type_errors
                    .push(IntegrityIssue::new(header, "Field not found in template").actual(cell));
                continue;
            };

            check_cell(field, header, cell, &mut result.accuracy);
            check_value(
                header,
                cell,
                resolve(header, form_data),
                resolve(header, &exported),
                &mut result.accuracy,
                &mut integrity.null_fields_handled,
            );
        }
    }

    if table.row_count() != 1 {
        integrity.corrupted_records.push(
            IntegrityIssue::new("record_count", format!("Expected 1 record, found {}", table.row_count()))
                .expected("1")
                .actual(table.row_count().to_string()),
        );
    }

    let total = integrity.total_records as f64;
    let corrupted = integrity.corrupted_records.len() as f64;
    let integrity_score = (100.0 * (total - corrupted) / total.max(1.0)).max(0.0);
    let accuracy_score = (100.0 - result.accuracy.penalty()).max(0.0);
    let overall = completeness_score * 0.3 + accuracy_score * 0.4 + integrity_score * 0.3;

    result.integrity = integrity;
    result.summary = IntegritySummary {
        overall_score: score(overall),
        completeness_score: score(completeness_score),
        accuracy_score: score(accuracy_score),
        integrity_score: score(integrity_score),
    };
    result.is_valid = result.summary.overall_score >= PASSING_SCORE
        && result.completeness.missing_fields.is_empty()
        && result.accuracy.data_type_errors.is_empty()
        && result.accuracy.value_discrepancies.is_empty();

    debug!(
        template = %template.id,
        overall = result.summary.overall_score,
        valid = result.is_valid,
        "checked export integrity"
    );

    result
}

fn is_system_column(header: &str) -> bool {
    SYSTEM_COLUMNS.iter().any(|(name, _)| *name == header)
}

/// Fill in missing/extra columns and return the unrounded score.
fn check_completeness(expected: &[String], headers: &[String], completeness: &mut Completeness) -> f64 {
    let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let known: HashSet<&str> = expected.iter().map(String::as_str).collect();

    completeness.expected_field_count = expected.len();
    completeness.present_field_count = headers.len();
    completeness.missing_fields = expected
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect();
    completeness.extra_fields = headers
        .iter()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect();

    let total = expected.len().max(1) as f64;
    let found = total - completeness.missing_fields.len() as f64;
    (100.0 * found / total - completeness.extra_fields.len() as f64 * EXTRA_COLUMN_PENALTY).max(0.0)
}

/// The schema row must describe each column the way the template does.
fn check_schema_row(fields: &HashMap<&str, &Field>, table: &ParsedCsv, accuracy: &mut Accuracy) {
    for (header, cell) in table.headers.iter().zip(&table.schema) {
        let Some(field) = fields.get(header.as_str()) else {
            continue;
        };
        let rule = SchemaRule::parse(cell);

        if rule.type_tag != field.field_type.as_str() {
            accuracy.data_type_errors.push(
                IntegrityIssue::new(header, "Schema type doesn't match template")
                    .expected(field.field_type.as_str())
                    .actual(rule.type_tag.as_str()),
            );
        }
        if rule.is_required() != field.required {
            let flag = |required: bool| if required { "required" } else { "optional" };
            accuracy.constraint_violations.push(
                IntegrityIssue::new(header, "Schema required flag doesn't match template")
                    .expected(flag(field.required))
                    .actual(flag(rule.is_required())),
            );
        }
    }
}

/// Type and constraint checks on one non-empty cell.
fn check_cell(field: &Field, header: &str, cell: &str, accuracy: &mut Accuracy) {
    if cell.is_empty() || cell == NULL_SENTINEL {
        return;
    }

    let number = cell.trim().parse::<f64>().ok();

    match field.field_type {
        FieldType::Number | FieldType::Range => {
            if number.is_none() {
                accuracy.data_type_errors.push(
                    IntegrityIssue::new(header, format!("Expected number, got: {}", cell))
                        .expected("number")
                        .actual(cell),
                );
            }
        }
        FieldType::Datatable => match serde_json::from_str::<Value>(cell) {
            Err(_) => accuracy.data_type_errors.push(
                IntegrityIssue::new(header, format!("Expected valid JSON for DataTable, got: {}", cell))
                    .expected("valid JSON")
                    .actual(cell),
            ),
            Ok(table) if !is_datatable(&table) => accuracy.data_type_errors.push(
                IntegrityIssue::new(header, "Invalid DataTable structure")
                    .expected("object with columns and rows arrays")
                    .actual(cell),
            ),
            Ok(_) => {}
        },
        other => {
            if let Some((pattern, label)) = type_check(other.as_str()) {
                if !pattern.is_match(cell) {
                    accuracy.data_type_errors.push(
                        IntegrityIssue::new(header, format!("Expected {} format, got: {}", label, cell))
                            .expected(label)
                            .actual(cell),
                    );
                }
            }
        }
    }

    if field.validation.is_none() {
        return;
    }
    let value = match (field.field_type, number) {
        (FieldType::Number | FieldType::Range, Some(n)) => FormValue::Number(n),
        _ => FormValue::from(cell),
    };
    if let Some(message) = validate_field(field, Some(&value)) {
        accuracy
            .constraint_violations
            .push(IntegrityIssue::new(header, message).actual(cell));
    }
}

fn is_datatable(value: &Value) -> bool {
    value.get("columns").map_or(false, Value::is_array) && value.get("rows").map_or(false, Value::is_array)
}

/// Compare a cell with what the exporter would have written for the source value.
///
/// `exported` is the value after nullification: `null` there for a filled
/// source value means the field was hidden.
fn check_value(
    header: &str,
    cell: &str,
    source: Option<&FormValue>,
    exported: Option<&FormValue>,
    accuracy: &mut Accuracy,
    null_fields_handled: &mut bool,
) {
    if !source.map_or(false, FormValue::is_filled) {
        if !cell.is_empty() && cell != NULL_SENTINEL {
            accuracy.value_discrepancies.push(
                IntegrityIssue::new(header, format!("Source value is empty but the export contains: {}", cell))
                    .expected("null or empty")
                    .actual(cell),
            );
        }
        return;
    }

    let expected = cell_value(source);

    if exported.map_or(false, FormValue::is_null) {
        if cell == NULL_SENTINEL {
            return;
        }
        if cell == expected {
            // Exported with original data preserved
            *null_fields_handled = false;
            return;
        }
        accuracy
            .value_discrepancies
            .push(IntegrityIssue::new(header, "Value mismatch").expected(NULL_SENTINEL).actual(cell));
        return;
    }

    if cell != expected {
        accuracy
            .value_discrepancies
            .push(IntegrityIssue::new(header, "Value mismatch").expected(expected).actual(cell));
    }
}

fn score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
