//! Completion progress and hidden-field nullification.
//!
//! Both operations are pure: they never mutate their inputs, so calling them
//! twice with the same arguments yields the same result.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::condition::evaluate;
use super::visibility::visible_fields;
use crate::models::{Field, FormData, FormValue, Section};

/// Percentage (0..=100) of visible required fields that are filled in.
///
/// Every section listed in `visited` is considered, even one whose own
/// condition currently hides it. Field visibility still applies inside it.
/// Sections in `na` count as complete and contribute no required fields.
/// With nothing considered the result is 0; with considered sections but no
/// required fields among them the result is 100.
pub fn calculate_progress<V, N>(sections: &[Section], form_data: &FormData, visited: &[V], na: &[N]) -> u8
where
    V: AsRef<str>,
    N: AsRef<str>,
{
    let visited: HashSet<&str> = visited.iter().map(|s| s.as_ref()).collect();
    let na: HashSet<&str> = na.iter().map(|s| s.as_ref()).collect();

    let mut considered = 0usize;
    let mut total_required = 0usize;
    let mut total_filled = 0usize;

    for section in sections {
        if !visited.contains(section.id.as_str()) {
            continue;
        }
        considered += 1;

        if na.contains(section.id.as_str()) {
            continue;
        }

        for field in visible_fields(&section.fields, form_data) {
            if !field.required {
                continue;
            }
            total_required += 1;
            if is_filled(field, form_data) {
                total_filled += 1;
            }
        }
    }

    if considered == 0 {
        return 0;
    }
    if total_required == 0 {
        return 100;
    }

    let percent = (100.0 * total_filled as f64 / total_required as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

fn is_filled(field: &Field, form_data: &FormData) -> bool {
    form_data.get(&field.id).map_or(false, FormValue::is_filled)
}

/// Copy of `form_data` where every conditional field that is hidden is `null`.
///
/// Conditions are first evaluated against the original snapshot. A field that
/// depends on a hidden field is hidden too, whatever that field still holds,
/// so hiding propagates down dependency chains. The result does not depend on
/// the order of fields in the template. Fields without a condition are copied
/// through untouched, as is every visible field.
pub fn update_conditional_fields_as_null(sections: &[Section], form_data: &FormData) -> FormData {
    let conditional: Vec<&Field> = sections
        .iter()
        .flat_map(|s| s.fields.iter())
        .filter(|f| f.conditional.is_some())
        .collect();

    let hidden = hidden_conditional_fields(&conditional, form_data);

    let mut updated = form_data.clone();
    for id in &hidden {
        updated.insert(id.to_string(), FormValue::Null);
    }

    if !hidden.is_empty() {
        debug!(count = hidden.len(), "nulled hidden conditional fields");
    }
    updated
}

/// Ids of conditional fields that are hidden, including transitively hidden ones.
///
/// Hiding only grows between rounds (a masked dependency can only turn a
/// condition false), so the loop terminates after at most one round per field.
fn hidden_conditional_fields<'a>(conditional: &[&'a Field], form_data: &FormData) -> BTreeSet<&'a str> {
    let mut hidden: BTreeSet<&str> = BTreeSet::new();
    let mut view = form_data.clone();

    loop {
        let newly_hidden: Vec<&'a str> = conditional
            .iter()
            .copied()
            .filter(|f| !hidden.contains(f.id.as_str()))
            .filter(|f| f.conditional.as_ref().map_or(false, |c| !evaluate(c, &view)))
            .map(|f| f.id.as_str())
            .collect();

        if newly_hidden.is_empty() {
            return hidden;
        }
        for id in newly_hidden {
            view.insert(id.to_string(), FormValue::Null);
            hidden.insert(id);
        }
    }
}
