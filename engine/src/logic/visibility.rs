//! Section and field visibility.
//!
//! Visibility is recomputed from the current form data on every call; callers
//! re-run it after each mutation.

use super::condition::evaluate;
use crate::models::{Condition, Field, FormData, Section};

/// Sections whose condition holds (or that have none), in template order.
pub fn visible_sections<'a>(sections: &'a [Section], form_data: &FormData) -> Vec<&'a Section> {
    sections
        .iter()
        .filter(|s| is_visible(s.conditional.as_ref(), form_data))
        .collect()
}

/// Fields whose condition holds (or that have none), in template order.
pub fn visible_fields<'a>(fields: &'a [Field], form_data: &FormData) -> Vec<&'a Field> {
    fields
        .iter()
        .filter(|f| is_visible(f.conditional.as_ref(), form_data))
        .collect()
}

/// `true` for no condition, otherwise the condition's result.
pub fn is_visible(conditional: Option<&Condition>, form_data: &FormData) -> bool {
    conditional.map_or(true, |c| evaluate(c, form_data))
}
