//! Per-field value validation for the form-filling surface.

use regex::Regex;

use crate::models::{Field, FormValue};

/// Check one value against a field's required flag and constraints.
///
/// Returns the first problem found as a user-facing message, or `None`.
/// Length limits apply to text, numeric limits to numbers; a missing value on
/// an optional field is never an error.
pub fn validate_field(field: &Field, value: Option<&FormValue>) -> Option<String> {
    let name = field.display_name();
    let present = value.map_or(false, FormValue::is_filled);

    if !present {
        return field.required.then(|| format!("{} is required", name));
    }

    let validation = field.validation.as_ref()?;

    match value? {
        FormValue::Text(text) => {
            let len = text.chars().count();
            if let Some(min) = validation.min_length {
                if len < min {
                    return Some(format!("{} must be at least {} characters", name, min));
                }
            }
            if let Some(max) = validation.max_length {
                if len > max {
                    return Some(format!("{} must be no more than {} characters", name, max));
                }
            }
            if let Some(pattern) = validation.pattern.as_deref() {
                return match Regex::new(pattern) {
                    Ok(re) if re.is_match(text) => None,
                    Ok(_) => Some(format!("{} format is invalid", name)),
                    Err(_) => Some(format!("{} has an invalid pattern: {}", name, pattern)),
                };
            }
            None
        }
        FormValue::Number(n) => {
            if let Some(min) = validation.min {
                if *n < min {
                    return Some(format!("{} must be at least {}", name, min));
                }
            }
            if let Some(max) = validation.max {
                if *n > max {
                    return Some(format!("{} must be no more than {}", name, max));
                }
            }
            None
        }
        _ => None,
    }
}
