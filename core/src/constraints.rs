//! Selecting constraint descriptions by validation group.
//!
//! # Design
//! A constraint tagged with no groups belongs to the default group and is
//! only described when no groups are requested. A constraint tagged with
//! groups is described when any one of them is requested. There is no
//! wildcard marker.
//!
//! Selection is a stable filter: descriptions come back in the order the
//! constraints were resolved, never re-sorted.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// Opaque identifier of a validation group. Only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupMarker(String);

impl GroupMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupMarker {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for GroupMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validation constraint on a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub groups: BTreeSet<GroupMarker>,
}

impl Constraint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Map::new(),
            groups: BTreeSet::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn in_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupMarker>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// Whether this constraint is described for a query on `requested`.
    pub fn applies_to(&self, requested: &[GroupMarker]) -> bool {
        if requested.is_empty() {
            self.groups.is_empty()
        } else {
            requested.iter().any(|group| self.groups.contains(group))
        }
    }
}

/// A constraint paired with its resolved human-readable description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribedConstraint {
    pub constraint: Constraint,
    pub description: String,
}

impl DescribedConstraint {
    pub fn new(constraint: Constraint, description: impl Into<String>) -> Self {
        Self {
            constraint,
            description: description.into(),
        }
    }
}

impl From<(Constraint, String)> for DescribedConstraint {
    fn from((constraint, description): (Constraint, String)) -> Self {
        Self::new(constraint, description)
    }
}

/// Descriptions of the constraints in `constraints` that apply to
/// `requested`, in input order.
pub fn select_descriptions(
    constraints: &[DescribedConstraint],
    requested: &[GroupMarker],
) -> Vec<String> {
    let selected: Vec<String> = constraints
        .iter()
        .filter(|described| described.constraint.applies_to(requested))
        .map(|described| described.description.clone())
        .collect();
    trace!(
        candidates = constraints.len(),
        selected = selected.len(),
        groups = requested.len(),
        "selected constraint descriptions"
    );
    selected
}

/// A description query as it arrives over a JSON boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionQuery {
    #[serde(default)]
    pub constraints: Vec<DescribedConstraint>,
    #[serde(default)]
    pub groups: Vec<GroupMarker>,
}

impl DescriptionQuery {
    pub fn select(&self) -> Vec<String> {
        select_descriptions(&self.constraints, &self.groups)
    }
}

/// Resolves the constraints declared on a property.
pub trait ConstraintResolver {
    fn resolve_for_property(&self, property: &str) -> Vec<Constraint>;
}

/// Turns a constraint into a human-readable description.
pub trait ConstraintDescriptionResolver {
    fn resolve_description(&self, constraint: &Constraint) -> String;
}

impl<F> ConstraintResolver for F
where
    F: Fn(&str) -> Vec<Constraint>,
{
    fn resolve_for_property(&self, property: &str) -> Vec<Constraint> {
        self(property)
    }
}

impl<F> ConstraintDescriptionResolver for F
where
    F: Fn(&Constraint) -> String,
{
    fn resolve_description(&self, constraint: &Constraint) -> String {
        self(constraint)
    }
}

/// Constraints registered up front, keyed by property name.
#[derive(Debug, Clone, Default)]
pub struct StaticConstraintResolver {
    properties: HashMap<String, Vec<Constraint>>,
}

impl StaticConstraintResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constraint` on `property`, after any already registered.
    pub fn add(&mut self, property: impl Into<String>, constraint: Constraint) {
        self.properties
            .entry(property.into())
            .or_default()
            .push(constraint);
    }

    pub fn with(mut self, property: impl Into<String>, constraint: Constraint) -> Self {
        self.add(property, constraint);
        self
    }
}

impl ConstraintResolver for StaticConstraintResolver {
    fn resolve_for_property(&self, property: &str) -> Vec<Constraint> {
        self.properties.get(property).cloned().unwrap_or_default()
    }
}

/// Group-aware constraint descriptions for the properties of one type.
#[derive(Debug, Clone)]
pub struct GroupConstraintDescriptions<R, D> {
    constraint_resolver: R,
    description_resolver: D,
}

impl<R, D> GroupConstraintDescriptions<R, D>
where
    R: ConstraintResolver,
    D: ConstraintDescriptionResolver,
{
    pub fn new(constraint_resolver: R, description_resolver: D) -> Self {
        Self {
            constraint_resolver,
            description_resolver,
        }
    }

    /// Descriptions of the constraints on `property` that apply to `groups`.
    /// An empty `groups` selects the default group.
    pub fn descriptions_for_property(&self, property: &str, groups: &[GroupMarker]) -> Vec<String> {
        let described: Vec<DescribedConstraint> = self
            .constraint_resolver
            .resolve_for_property(property)
            .into_iter()
            .map(|constraint| {
                let description = self.description_resolver.resolve_description(&constraint);
                DescribedConstraint::new(constraint, description)
            })
            .collect();
        select_descriptions(&described, groups)
    }
}
