//! Conditional logic engine.
//!
//! This module evaluates visibility conditions over form data:
//! - `resolver`: `dependsOn` lookup (bare id or `section.field`)
//! - `condition`: single and compound condition evaluation
//! - `visibility`: visible sections and fields
//! - `progress`: completion percentage and hidden-field nullification
//! - `field_validation`: per-value required/constraint checks
//!
//! ## Usage Flow
//!
//! ```text
//! sections + formData → visible_sections / visible_fields → (user edits)
//!                     → calculate_progress + update_conditional_fields_as_null → persist
//! ```

pub mod condition;
pub mod field_validation;
pub mod progress;
pub mod resolver;
pub mod visibility;

pub use condition::{evaluate, evaluate_compound, evaluate_single};
pub use field_validation::validate_field;
pub use progress::{calculate_progress, update_conditional_fields_as_null};
pub use resolver::{field_key, parse_field_key, resolve};
pub use visibility::{is_visible, visible_fields, visible_sections};
