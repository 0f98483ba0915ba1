//! Domain models for the formkit engine.
//!
//! This module contains the template-side data structures consumed by the
//! conditional logic engine and the CSV exporter:
//!
//! - [`Template`] / [`Section`] / [`Field`] - Form structure (immutable at evaluation time)
//! - [`Condition`] - Single or compound visibility condition
//! - [`FormValue`] / [`FormData`] - User-entered values keyed by bare field id
//!
//! All types use the camelCase JSON shape produced by the form builder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::TemplateResult;

// =============================================================================
// Form Values
// =============================================================================

/// A single value held in form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Explicitly cleared, usually by conditional nullification.
    Null,
    /// Toggle / boolean checkbox.
    Bool(bool),
    /// Number or range input.
    Number(f64),
    /// Any text-like input (text, email, select, radio, date...).
    Text(String),
    /// Multi-select checkbox.
    List(Vec<String>),
}

impl FormValue {
    /// Whether the value counts as "filled in" for progress purposes.
    pub fn is_filled(&self) -> bool {
        match self {
            FormValue::Null => false,
            FormValue::Text(s) => !s.is_empty(),
            FormValue::List(items) => !items.is_empty(),
            FormValue::Bool(_) | FormValue::Number(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FormValue::Null)
    }
}

impl fmt::Display for FormValue {
    /// Stringification used by condition comparison: lists are comma-joined,
    /// booleans render as `true`/`false`, integral numbers without a fraction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Null => write!(f, "null"),
            FormValue::Bool(b) => write!(f, "{}", b),
            FormValue::Number(n) => write!(f, "{}", n),
            FormValue::Text(s) => f.write_str(s),
            FormValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(value: Vec<String>) -> Self {
        FormValue::List(value)
    }
}

impl From<Vec<&str>> for FormValue {
    fn from(value: Vec<&str>) -> Self {
        FormValue::List(value.into_iter().map(String::from).collect())
    }
}

/// Form data: bare field id → value.
pub type FormData = BTreeMap<String, FormValue>;

// =============================================================================
// Conditions
// =============================================================================

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
}

/// Combinator of a compound condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    And,
    Or,
}

/// A leaf condition on one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCondition {
    /// Bare field id or `section.field`.
    pub depends_on: String,
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<String>,
}

/// AND/OR over nested conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundCondition {
    pub logic: Logic,
    pub conditions: Vec<Condition>,
}

/// Visibility condition attached to a section or field.
///
/// JSON objects carrying a `logic` key deserialize as [`Condition::Compound`],
/// everything else as [`Condition::Single`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Compound(CompoundCondition),
    Single(SingleCondition),
}

impl Condition {
    /// Build a single condition.
    pub fn single<I, S>(depends_on: impl Into<String>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::Single(SingleCondition {
            depends_on: depends_on.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Shorthand for `dependsOn equals value`.
    pub fn equals(depends_on: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(depends_on, Operator::Equals, [value.into()])
    }

    /// True only when every child holds.
    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Compound(CompoundCondition {
            logic: Logic::And,
            conditions: conditions.into_iter().collect(),
        })
    }

    /// True when at least one child holds.
    pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Compound(CompoundCondition {
            logic: Logic::Or,
            conditions: conditions.into_iter().collect(),
        })
    }

    /// Every `dependsOn` reference in this condition tree, left to right.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(cond) = stack.pop() {
            match cond {
                Condition::Single(single) => out.push(single.depends_on.as_str()),
                Condition::Compound(compound) => {
                    stack.extend(compound.conditions.iter().rev());
                }
            }
        }
        out
    }
}

// =============================================================================
// Template structure
// =============================================================================

/// Input type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Tel,
    Date,
    Number,
    Select,
    Radio,
    Checkbox,
    Range,
    File,
    Datatable,
}

impl FieldType {
    /// Type tag written in the CSV schema row.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Range => "range",
            FieldType::File => "file",
            FieldType::Datatable => "datatable",
        }
    }
}

/// Optional value constraints on a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// A form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label, used in validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Allows several options to be selected at once.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FormValue>,
}

impl Field {
    /// Create a field with no options, constraints or condition.
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: None,
            required: false,
            options: None,
            multiple: false,
            validation: None,
            conditional: None,
            default_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_conditional(mut self, condition: Condition) -> Self {
        self.conditional = Some(condition);
        self
    }

    /// Label for messages, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A titled group of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Condition>,
}

impl Section {
    pub fn new(id: impl Into<String>, fields: Vec<Field>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            fields,
            conditional: None,
        }
    }

    pub fn with_conditional(mut self, condition: Condition) -> Self {
        self.conditional = Some(condition);
        self
    }
}

/// A form template. Only `sections` matters to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Template {
    /// Load a template from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Find a field and its section by bare field id.
    pub fn find_field(&self, field_id: &str) -> Option<(&Section, &Field)> {
        self.sections.iter().find_map(|section| {
            section
                .fields
                .iter()
                .find(|f| f.id == field_id)
                .map(|f| (section, f))
        })
    }
}

/// Load form data from a JSON file.
pub fn load_form_data(path: impl AsRef<Path>) -> TemplateResult<FormData> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_shape_dispatch() {
        let single: Condition = serde_json::from_value(json!({
            "dependsOn": "age",
            "operator": "equals",
            "values": ["18+"]
        }))
        .unwrap();
        assert!(matches!(single, Condition::Single(_)));

        let compound: Condition = serde_json::from_value(json!({
            "logic": "or",
            "conditions": [
                { "dependsOn": "a", "operator": "not_equals", "values": ["x"] },
                { "logic": "and", "conditions": [] }
            ]
        }))
        .unwrap();
        match compound {
            Condition::Compound(c) => {
                assert_eq!(c.logic, Logic::Or);
                assert_eq!(c.conditions.len(), 2);
                assert!(matches!(c.conditions[1], Condition::Compound(_)));
            }
            Condition::Single(_) => panic!("expected compound"),
        }
    }

    #[test]
    fn test_form_value_shapes() {
        let data: FormData = serde_json::from_value(json!({
            "name": "Alice",
            "age": 30,
            "active": true,
            "tags": ["a", "b"],
            "hidden": null
        }))
        .unwrap();

        assert_eq!(data["name"], FormValue::Text("Alice".into()));
        assert_eq!(data["age"], FormValue::Number(30.0));
        assert_eq!(data["active"], FormValue::Bool(true));
        assert_eq!(data["tags"], FormValue::from(vec!["a", "b"]));
        assert!(data["hidden"].is_null());
    }

    #[test]
    fn test_form_value_display() {
        assert_eq!(FormValue::Number(5.0).to_string(), "5");
        assert_eq!(FormValue::Number(2.5).to_string(), "2.5");
        assert_eq!(FormValue::Bool(false).to_string(), "false");
        assert_eq!(FormValue::from(vec!["x", "y"]).to_string(), "x,y");
    }

    #[test]
    fn test_is_filled() {
        assert!(!FormValue::Null.is_filled());
        assert!(!FormValue::Text(String::new()).is_filled());
        assert!(!FormValue::List(vec![]).is_filled());
        assert!(FormValue::Bool(false).is_filled());
        assert!(FormValue::Number(0.0).is_filled());
    }

    #[test]
    fn test_template_deserialize() {
        let template: Template = serde_json::from_value(json!({
            "id": "t1",
            "name": "Intake",
            "sections": [{
                "id": "general",
                "title": "General",
                "fields": [
                    { "id": "name", "type": "text", "required": true },
                    { "id": "color", "type": "checkbox", "options": ["red", "blue"], "multiple": true,
                      "conditional": { "dependsOn": "general.name", "operator": "equals", "values": ["x"] } }
                ]
            }]
        }))
        .unwrap();

        let (section, field) = template.find_field("color").unwrap();
        assert_eq!(section.id, "general");
        assert!(field.multiple);
        assert_eq!(field.conditional.as_ref().unwrap().dependencies(), vec!["general.name"]);
    }

    #[test]
    fn test_dependencies_order() {
        let cond = Condition::and([
            Condition::equals("a", "1"),
            Condition::or([Condition::equals("b", "2"), Condition::equals("c", "3")]),
        ]);
        assert_eq!(cond.dependencies(), vec!["a", "b", "c"]);
    }
}
