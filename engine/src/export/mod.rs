//! Export of form records to the two-row schema CSV format.
//!
//! Columns are the six system columns followed by one `section.field` column
//! per template field. The schema row describes each column so the output
//! can be checked with [`crate::validate_csv`] and merged with
//! [`crate::combine_csvs`].
//!
//! Hidden conditional fields are exported as the literal `null` unless the
//! caller asks to preserve the original data.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::NULL_SENTINEL;
use crate::error::CsvResult;
use crate::logic::{field_key, resolve, update_conditional_fields_as_null};
use crate::models::{Field, FormData, FormValue, Template};
use crate::parser::write_rows;

/// System columns and their schema cells, in export order.
pub const SYSTEM_COLUMNS: [(&str, &str); 6] = [
    ("id", "system|identifier"),
    ("status", "system|enum:Completed,In Progress,Submitted"),
    ("progress", "system|number|min:0|max:100"),
    ("created_at", "system|datetime"),
    ("updated_at", "system|datetime"),
    ("last_saved", "system|datetime"),
];

/// Lifecycle state of an exported record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    Submitted,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordStatus::Completed => "Completed",
            RecordStatus::InProgress => "In Progress",
            RecordStatus::Submitted => "Submitted",
        })
    }
}

/// One row of exported data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub id: String,
    pub status: RecordStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_saved: DateTime<Utc>,
    pub data: FormData,
}

impl ExportRecord {
    /// A freshly submitted record: new v4 id, all timestamps now, 100%.
    pub fn submitted(data: FormData) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: RecordStatus::Submitted,
            progress: 100,
            created_at: now,
            updated_at: now,
            last_saved: now,
            data,
        }
    }

    /// A record still being filled in.
    pub fn in_progress(data: FormData, progress: u8) -> Self {
        Self {
            status: RecordStatus::InProgress,
            progress: progress.min(100),
            ..Self::submitted(data)
        }
    }
}

/// Export records for `template` as CSV text.
///
/// With `preserve_original` set, hidden conditional fields keep whatever
/// value they hold instead of being exported as `null`.
pub fn export_records(template: &Template, records: &[ExportRecord], preserve_original: bool) -> CsvResult<String> {
    let fields: Vec<(String, &Field)> = template
        .sections
        .iter()
        .flat_map(|section| {
            section
                .fields
                .iter()
                .map(move |field| (field_key(&field.id, Some(section.id.as_str())), field))
        })
        .collect();

    let headers: Vec<String> = SYSTEM_COLUMNS
        .iter()
        .map(|(name, _)| name.to_string())
        .chain(fields.iter().map(|(key, _)| key.clone()))
        .collect();

    let schema: Vec<String> = SYSTEM_COLUMNS
        .iter()
        .map(|(_, cell)| cell.to_string())
        .chain(fields.iter().map(|(_, field)| schema_cell(field)))
        .collect();

    let mut rows = vec![headers, schema];
    for record in records {
        let data = if preserve_original {
            record.data.clone()
        } else {
            update_conditional_fields_as_null(&template.sections, &record.data)
        };

        let mut row = vec![
            record.id.clone(),
            record.status.to_string(),
            record.progress.to_string(),
            timestamp(&record.created_at),
            timestamp(&record.updated_at),
            timestamp(&record.last_saved),
        ];
        row.extend(fields.iter().map(|(key, _)| cell_value(resolve(key, &data))));
        rows.push(row);
    }

    debug!(template = %template.id, records = records.len(), columns = rows[0].len(), "exported records");

    write_rows(rows, b',')
}

/// Schema cell describing one template field.
pub fn schema_cell(field: &Field) -> String {
    let mut parts = vec![
        field.field_type.as_str().to_string(),
        if field.required { "required" } else { "optional" }.to_string(),
    ];

    if let Some(validation) = &field.validation {
        if let Some(pattern) = &validation.pattern {
            parts.push(format!("pattern:{}", pattern));
        }
        if let Some(min) = validation.min {
            parts.push(format!("min:{}", min));
        }
        if let Some(max) = validation.max {
            parts.push(format!("max:{}", max));
        }
        if let Some(min_length) = validation.min_length {
            parts.push(format!("minLength:{}", min_length));
        }
        if let Some(max_length) = validation.max_length {
            parts.push(format!("maxLength:{}", max_length));
        }
    }

    if let Some(options) = &field.options {
        parts.push(format!("options:{}", options.join(",")));
    }
    if field.multiple {
        parts.push("multiple".to_string());
    }
    if let Some(condition) = &field.conditional {
        if let Some(depends_on) = condition.dependencies().first() {
            parts.push(format!("depends_on:{}", depends_on));
        }
    }

    parts.join("|")
}

/// Cell text for one value as written by the exporter.
pub(crate) fn cell_value(value: Option<&FormValue>) -> String {
    match value {
        None => String::new(),
        Some(FormValue::Null) => NULL_SENTINEL.to_string(),
        Some(FormValue::List(items)) => items.join("; "),
        Some(other) => other.to_string(),
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
