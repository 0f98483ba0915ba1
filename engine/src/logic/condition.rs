//! Condition evaluation.
//!
//! Comparisons are case-insensitive. A dependency that is missing or `null`
//! makes any single condition false, including `not_equals`.
//!
//! Compound conditions recurse without a depth limit; a pathologically deep
//! template grows the native stack accordingly.

use super::resolver::resolve;
use crate::models::{CompoundCondition, Condition, FormData, FormValue, Logic, Operator, SingleCondition};

/// Evaluate any condition against form data.
pub fn evaluate(condition: &Condition, form_data: &FormData) -> bool {
    match condition {
        Condition::Single(single) => evaluate_single(single, form_data),
        Condition::Compound(compound) => evaluate_compound(compound, form_data),
    }
}

/// Evaluate one `dependsOn`/operator/values condition.
pub fn evaluate_single(condition: &SingleCondition, form_data: &FormData) -> bool {
    let value = match resolve(&condition.depends_on, form_data) {
        None | Some(FormValue::Null) => return false,
        Some(value) => value,
    };

    match condition.operator {
        Operator::Equals => equals_any(value, &condition.values),
        Operator::NotEquals => !equals_any(value, &condition.values),
        Operator::Contains => contains_any(value, &condition.values),
    }
}

/// Evaluate an AND/OR node, short-circuiting left to right.
pub fn evaluate_compound(condition: &CompoundCondition, form_data: &FormData) -> bool {
    let mut children = condition.conditions.iter();
    match condition.logic {
        Logic::And => children.all(|c| evaluate(c, form_data)),
        Logic::Or => children.any(|c| evaluate(c, form_data)),
    }
}

fn equals_any(value: &FormValue, targets: &[String]) -> bool {
    let actual = value.to_string().to_lowercase();
    targets.iter().any(|t| t.to_lowercase() == actual)
}

fn contains_any(value: &FormValue, targets: &[String]) -> bool {
    match value {
        FormValue::List(items) => targets.iter().any(|t| {
            let t = t.to_lowercase();
            items.iter().any(|item| item.to_lowercase() == t)
        }),
        // Text, numbers and booleans: substring search on the stringified value.
        other => {
            let haystack = other.to_string().to_lowercase();
            targets.iter().any(|t| haystack.contains(&t.to_lowercase()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: Vec<(&str, FormValue)>) -> FormData {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn single(depends_on: &str, operator: Operator, values: &[&str]) -> Condition {
        Condition::single(depends_on, operator, values.iter().copied())
    }

    #[test]
    fn test_equals() {
        let cond = single("age", Operator::Equals, &["18+"]);
        assert!(evaluate(&cond, &form(vec![("age", "18+".into())])));
        assert!(!evaluate(&cond, &form(vec![("age", "under-18".into())])));
    }

    #[test]
    fn test_equals_any_of() {
        let cond = single("color", Operator::Equals, &["red", "blue", "green"]);
        assert!(evaluate(&cond, &form(vec![("color", "blue".into())])));
        assert!(!evaluate(&cond, &form(vec![("color", "yellow".into())])));
    }

    #[test]
    fn test_case_insensitive() {
        let cond = single("f", Operator::Equals, &["YES"]);
        assert!(evaluate(&cond, &form(vec![("f", "yes".into())])));
    }

    #[test]
    fn test_not_equals() {
        let cond = single("status", Operator::NotEquals, &["inactive"]);
        assert!(evaluate(&cond, &form(vec![("status", "active".into())])));
        assert!(!evaluate(&cond, &form(vec![("status", "Inactive".into())])));
    }

    #[test]
    fn test_missing_or_null_is_false_for_every_operator() {
        for op in [Operator::Equals, Operator::NotEquals, Operator::Contains] {
            let cond = single("field", op, &["value"]);
            assert!(!evaluate(&cond, &FormData::new()));
            assert!(!evaluate(&cond, &form(vec![("field", FormValue::Null)])));
        }
    }

    #[test]
    fn test_empty_string_target() {
        let cond = single("field", Operator::Equals, &[""]);
        assert!(evaluate(&cond, &form(vec![("field", "".into())])));
        assert!(!evaluate(&cond, &form(vec![("field", "something".into())])));
    }

    #[test]
    fn test_boolean_values() {
        let cond = single("isActive", Operator::Equals, &["true"]);
        assert!(evaluate(&cond, &form(vec![("isActive", true.into())])));
        assert!(!evaluate(&cond, &form(vec![("isActive", false.into())])));
    }

    #[test]
    fn test_contains_string() {
        let cond = single("description", Operator::Contains, &["urgent"]);
        assert!(evaluate(&cond, &form(vec![("description", "This is an URGENT request".into())])));
        assert!(!evaluate(&cond, &form(vec![("description", "Normal request".into())])));
    }

    #[test]
    fn test_contains_array() {
        let cond = single("tags", Operator::Contains, &["important"]);
        assert!(evaluate(&cond, &form(vec![("tags", vec!["urgent", "important", "review"].into())])));
        assert!(!evaluate(&cond, &form(vec![("tags", vec!["normal", "low-priority"].into())])));
        // Element match, not substring of an element.
        let cond = single("tags", Operator::Contains, &["port"]);
        assert!(!evaluate(&cond, &form(vec![("tags", vec!["important"].into())])));
    }

    #[test]
    fn test_contains_number_and_bool_stringify() {
        let cond = single("count", Operator::Contains, &["2"]);
        assert!(evaluate(&cond, &form(vec![("count", 120.0.into())])));
        assert!(!evaluate(&cond, &form(vec![("count", 13.0.into())])));

        let cond = single("flag", Operator::Contains, &["ru"]);
        assert!(evaluate(&cond, &form(vec![("flag", true.into())])));
    }

    #[test]
    fn test_section_scoped_reference() {
        let cond = single("section1.field1", Operator::Equals, &["value1"]);
        assert!(evaluate(&cond, &form(vec![("field1", "value1".into())])));
    }

    #[test]
    fn test_compound_truth_table() {
        let c1 = Condition::equals("f1", "v1");
        let c2 = Condition::equals("f2", "v2");
        let or = Condition::or([c1.clone(), c2.clone()]);
        let and = Condition::and([c1, c2]);

        for (a, b) in [(true, true), (true, false), (false, true), (false, false)] {
            let data = form(vec![
                ("f1", if a { "v1" } else { "x" }.into()),
                ("f2", if b { "v2" } else { "x" }.into()),
            ]);
            assert_eq!(evaluate(&or, &data), a || b, "or({a}, {b})");
            assert_eq!(evaluate(&and, &data), a && b, "and({a}, {b})");
        }
    }

    #[test]
    fn test_nested_compound() {
        // (a = 1 AND (b = 2 OR c = 3))
        let cond = Condition::and([
            Condition::equals("a", "1"),
            Condition::or([Condition::equals("b", "2"), Condition::equals("c", "3")]),
        ]);
        assert!(evaluate(&cond, &form(vec![("a", "1".into()), ("c", "3".into())])));
        assert!(!evaluate(&cond, &form(vec![("a", "1".into()), ("b", "9".into())])));
        assert!(!evaluate(&cond, &form(vec![("b", "2".into())])));
    }

    #[test]
    fn test_empty_compound() {
        assert!(evaluate(&Condition::and([]), &FormData::new()));
        assert!(!evaluate(&Condition::or([]), &FormData::new()));
    }
}
