//! Schema cell parsing.
//!
//! A schema cell is a pipe-separated list: a type tag first, then flags
//! (`required`, `optional`, `multiple`) and `key:value` parameters
//! (`options:a,b`, `min:0`, `pattern:...`).
//!
//! System columns use a two-segment tag: `system|identifier`,
//! `system|datetime`, `system|number`. `system|enum:A,B` carries its
//! allowed values in the tag segment itself.

use std::collections::{BTreeMap, BTreeSet};

/// A parsed schema cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRule {
    /// Type tag, e.g. `text`, `email`, `system|identifier`.
    pub type_tag: String,
    /// Bare flags such as `required` or `multiple`.
    pub flags: BTreeSet<String>,
    /// Allowed values from `options:` or `system|enum:`.
    pub options: Option<Vec<String>>,
    /// Remaining `key:value` parameters.
    pub params: BTreeMap<String, String>,
}

impl SchemaRule {
    /// Parse one schema cell. Never fails; unknown segments become flags.
    pub fn parse(cell: &str) -> Self {
        let mut segments = cell.split('|').map(str::trim);
        let mut rule = SchemaRule {
            type_tag: segments.next().unwrap_or_default().to_string(),
            ..Default::default()
        };

        if rule.type_tag == "system" {
            if let Some(kind) = segments.next() {
                match kind.split_once(':') {
                    Some(("enum", values)) => {
                        rule.type_tag = "system|enum".to_string();
                        rule.options = Some(split_options(values));
                    }
                    _ => rule.type_tag = format!("system|{}", kind),
                }
            }
        }

        for segment in segments.filter(|s| !s.is_empty()) {
            match segment.split_once(':') {
                Some(("options", values)) => rule.options = Some(split_options(values)),
                Some((key, value)) => {
                    rule.params.insert(key.to_string(), value.to_string());
                }
                None => {
                    rule.flags.insert(segment.to_string());
                }
            }
        }

        rule
    }

    pub fn is_required(&self) -> bool {
        self.flags.contains("required")
    }

    pub fn is_multiple(&self) -> bool {
        self.flags.contains("multiple")
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

fn split_options(values: &str) -> Vec<String> {
    values.split(',').map(String::from).collect()
}
