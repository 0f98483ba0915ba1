//! End-to-end checks of the conditional logic engine over JSON templates.

use formkit::{
    calculate_progress, evaluate, update_conditional_fields_as_null, visible_fields, visible_sections, Condition,
    FormData, FormValue, Template,
};
use serde_json::json;

fn survey() -> Template {
    serde_json::from_value(json!({
        "id": "survey",
        "name": "Pet survey",
        "sections": [
            {
                "id": "about",
                "title": "About you",
                "fields": [
                    { "id": "name", "type": "text", "required": true },
                    { "id": "hasPet", "type": "radio", "required": true, "options": ["yes", "no"] }
                ]
            },
            {
                "id": "pets",
                "title": "Your pets",
                "conditional": { "dependsOn": "about.hasPet", "operator": "equals", "values": ["yes"] },
                "fields": [
                    { "id": "petKind", "type": "select", "required": true, "options": ["dog", "cat"] },
                    {
                        "id": "dogBreed",
                        "type": "text",
                        "required": true,
                        "conditional": { "dependsOn": "petKind", "operator": "equals", "values": ["dog"] }
                    },
                    {
                        "id": "breedNotes",
                        "type": "textarea",
                        "conditional": { "dependsOn": "dogBreed", "operator": "not_equals", "values": [""] }
                    }
                ]
            },
            {
                "id": "contact",
                "fields": [
                    { "id": "email", "type": "email" },
                    {
                        "id": "phone",
                        "type": "tel",
                        "required": true,
                        "conditional": {
                            "logic": "or",
                            "conditions": [
                                { "dependsOn": "email", "operator": "equals", "values": [""] },
                                { "dependsOn": "contactPrefs", "operator": "contains", "values": ["phone"] }
                            ]
                        }
                    }
                ]
            }
        ]
    }))
    .unwrap()
}

fn data(value: serde_json::Value) -> FormData {
    serde_json::from_value(value).unwrap()
}

fn ids<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    items.into_iter().collect()
}

#[test]
fn sections_follow_section_scoped_references() {
    let template = survey();

    let no_pet = data(json!({ "name": "Ada", "hasPet": "no" }));
    let visible = visible_sections(&template.sections, &no_pet);
    assert_eq!(ids(visible.iter().map(|s| s.id.as_str())), vec!["about", "contact"]);

    let pet = data(json!({ "name": "Ada", "hasPet": "YES" }));
    let visible = visible_sections(&template.sections, &pet);
    assert_eq!(ids(visible.iter().map(|s| s.id.as_str())), vec!["about", "pets", "contact"]);
}

#[test]
fn compound_or_over_list_values() {
    let template = survey();
    let contact = &template.sections[2];

    let by_email = data(json!({ "email": "ada@example.com", "contactPrefs": ["email"] }));
    assert_eq!(
        ids(visible_fields(&contact.fields, &by_email).iter().map(|f| f.id.as_str())),
        vec!["email"]
    );

    let by_phone = data(json!({ "email": "ada@example.com", "contactPrefs": ["email", "Phone"] }));
    assert_eq!(
        ids(visible_fields(&contact.fields, &by_phone).iter().map(|f| f.id.as_str())),
        vec!["email", "phone"]
    );
}

#[test]
fn missing_dependency_is_false_for_every_operator() {
    let empty = FormData::new();
    for operator in ["equals", "not_equals", "contains"] {
        let condition: Condition = serde_json::from_value(json!({
            "dependsOn": "ghost",
            "operator": operator,
            "values": ["x"]
        }))
        .unwrap();
        assert!(!evaluate(&condition, &empty), "{} should be false", operator);
    }
}

#[test]
fn progress_counts_only_visible_required_fields_of_visited_sections() {
    let template = survey();
    let form = data(json!({ "name": "Ada", "hasPet": "yes", "petKind": "cat", "email": "" }));

    // about: 2/2; pets: petKind 1/1 (dogBreed hidden)
    assert_eq!(calculate_progress(&template.sections, &form, &["about", "pets"], &[] as &[&str]), 100);

    // contact: phone visible (email empty) and missing
    assert_eq!(
        calculate_progress(&template.sections, &form, &["about", "pets", "contact"], &[] as &[&str]),
        75
    );

    // marking contact N/A drops its requirement
    assert_eq!(
        calculate_progress(&template.sections, &form, &["about", "pets", "contact"], &["contact"]),
        100
    );
}

#[test]
fn nullification_cascades_and_is_idempotent() {
    let template = survey();
    let form = data(json!({
        "name": "Ada",
        "hasPet": "yes",
        "petKind": "cat",
        "dogBreed": "Beagle",
        "breedNotes": "friendly"
    }));

    let once = update_conditional_fields_as_null(&template.sections, &form);
    assert_eq!(once["dogBreed"], FormValue::Null);
    assert_eq!(once["breedNotes"], FormValue::Null);
    assert_eq!(once["petKind"], FormValue::from("cat"));
    assert_eq!(once["name"], FormValue::from("Ada"));

    let twice = update_conditional_fields_as_null(&template.sections, &once);
    assert_eq!(once, twice);

    // input untouched
    assert_eq!(form["dogBreed"], FormValue::from("Beagle"));
}

#[test]
fn form_data_round_trips_through_json() {
    let form = data(json!({ "a": null, "b": true, "c": 3.5, "d": "x", "e": ["p", "q"] }));
    assert_eq!(form["a"], FormValue::Null);
    assert_eq!(form["b"], FormValue::Bool(true));
    assert_eq!(form["c"], FormValue::Number(3.5));
    assert_eq!(form["e"], FormValue::from(vec!["p", "q"]));

    let back = serde_json::to_value(&form).unwrap();
    assert_eq!(back["e"], json!(["p", "q"]));
}
