//! Field reference resolution.
//!
//! Conditions reference fields either by bare id (`email`) or section-scoped
//! (`contact.email`), while form data is always keyed by bare id.

use crate::models::{FormData, FormValue};

/// Resolve a `dependsOn` reference against form data.
///
/// Lookup order:
/// 1. exact key (even when it looks like `section.field`);
/// 2. for exactly one dot with two non-empty parts, the part after the dot;
/// 3. nothing. `a.b.c` is not decomposed.
pub fn resolve<'a>(depends_on: &str, form_data: &'a FormData) -> Option<&'a FormValue> {
    if let Some(value) = form_data.get(depends_on) {
        return Some(value);
    }

    match parse_field_key(depends_on) {
        (Some(_), field_id) => form_data.get(field_id),
        (None, _) => None,
    }
}

/// Build the key used in CSV headers: `section.field`, or the bare id.
pub fn field_key(field_id: &str, section_id: Option<&str>) -> String {
    match section_id {
        Some(section) => format!("{}.{}", section, field_id),
        None => field_id.to_string(),
    }
}

/// Split a key into `(section, field)`.
///
/// Only a key with exactly one dot and two non-empty parts is split.
pub fn parse_field_key(key: &str) -> (Option<&str>, &str) {
    let mut parts = key.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(section), Some(field), None) if !section.is_empty() && !field.is_empty() => {
            (Some(section), field)
        }
        _ => (None, key),
    }
}
