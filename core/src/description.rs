//! Template-based constraint descriptions.
//!
//! Templates are keyed by constraint name. `${name}` placeholders are filled
//! from the constraint's attributes.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::constraints::{Constraint, ConstraintDescriptionResolver};

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("AssertFalse", "Must be false"),
    ("AssertTrue", "Must be true"),
    ("DecimalMax", "Must be at most ${value}"),
    ("DecimalMin", "Must be at least ${value}"),
    (
        "Digits",
        "Must have at most ${integer} integral digits and ${fraction} fractional digits",
    ),
    ("Email", "Must be a well-formed email address"),
    ("Future", "Must be in the future"),
    ("FutureOrPresent", "Must be in the present or the future"),
    ("Max", "Must be at most ${value}"),
    ("Min", "Must be at least ${value}"),
    ("Negative", "Must be negative"),
    ("NegativeOrZero", "Must be negative or zero"),
    ("NotBlank", "Must not be blank"),
    ("NotEmpty", "Must not be empty"),
    ("NotNull", "Must not be null"),
    ("Null", "Must be null"),
    ("Past", "Must be in the past"),
    ("PastOrPresent", "Must be in the past or the present"),
    ("Pattern", "Must match the regular expression `${regexp}`"),
    ("Positive", "Must be positive"),
    ("PositiveOrZero", "Must be positive or zero"),
    ("Size", "Size must be between ${min} and ${max} inclusive"),
];

/// Describes constraints by filling in per-name templates.
///
/// A constraint with no registered template is described by its name.
#[derive(Debug, Clone, Default)]
pub struct TemplateDescriptionResolver {
    templates: HashMap<String, String>,
}

impl TemplateDescriptionResolver {
    /// An empty resolver with no templates registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver preloaded with descriptions of the common bean-validation
    /// constraints (`NotNull`, `Size`, `Pattern`, ...).
    pub fn with_defaults() -> Self {
        DEFAULT_TEMPLATES
            .iter()
            .fold(Self::new(), |resolver, (name, template)| {
                resolver.with_template(*name, *template)
            })
    }

    /// Register or replace the template for `constraint_name`.
    pub fn with_template(
        mut self,
        constraint_name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.templates.insert(constraint_name.into(), template.into());
        self
    }
}

impl ConstraintDescriptionResolver for TemplateDescriptionResolver {
    fn resolve_description(&self, constraint: &Constraint) -> String {
        match self.templates.get(&constraint.name) {
            Some(template) => interpolate(template, &constraint.attributes),
            None => constraint.name.clone(),
        }
    }
}

/// Replace each `${key}` in `template` with the matching attribute. Keys
/// without an attribute, and an unterminated `${`, are kept verbatim.
fn interpolate(template: &str, attributes: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match attributes.get(key) {
            Some(value) => out.push_str(&display_value(value)),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
