//! Rule model for IDS documents
//!
//! A [`Document`] is an `info` block plus an ordered list of
//! [`Specification`]s. Each specification pairs an applicability
//! [`RuleSet`] (which elements it selects) with a requirements
//! [`RuleSet`] (what those elements must satisfy).

use serde::{Serialize, Serializer};
use std::fmt;
use std::mem;
use thiserror::Error;
use uuid::Uuid;

/// Schema version used when a document or specification names none
pub const DEFAULT_IFC_VERSION: &str = "IFC4";

/// Title used when a document has no `title` element
pub const DEFAULT_TITLE: &str = "Untitled";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("condition '{condition}' cannot hold a value of kind {found}")]
    ConditionMismatch {
        condition: Condition,
        found: &'static str,
    },
}

/// Current local date as `YYYY-MM-DD`
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Document metadata (`info` element)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub title: String,
    pub copyright: String,
    /// Default IFC schema version of the document
    pub version: String,
    pub author: String,
    /// ISO 8601 calendar date
    pub date: String,
    pub description: String,
    pub purpose: String,
    pub milestone: String,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            copyright: String::new(),
            version: DEFAULT_IFC_VERSION.to_string(),
            author: String::new(),
            date: today(),
            description: String::new(),
            purpose: String::new(),
            milestone: String::new(),
        }
    }
}

/// An IDS document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub info: Info,
    pub specifications: Vec<Specification>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a specification by id
    pub fn specification(&self, id: SpecId) -> Option<&Specification> {
        self.specifications.iter().find(|s| s.id == id)
    }

    /// Find a specification by id for editing
    pub fn specification_mut(&mut self, id: SpecId) -> Option<&mut Specification> {
        self.specifications.iter_mut().find(|s| s.id == id)
    }

    /// Structural equality that ignores the session-local specification ids
    pub fn eq_ignoring_ids(&self, other: &Document) -> bool {
        self.info == other.info
            && self.specifications.len() == other.specifications.len()
            && self
                .specifications
                .iter()
                .zip(&other.specifications)
                .all(|(a, b)| a.eq_ignoring_id(b))
    }
}

/// Process-local handle for a specification.
///
/// Never read from or written to XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SpecId(Uuid);

impl SpecId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpecId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single applicability/requirements pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub id: SpecId,
    pub name: String,
    pub ifc_version: String,
    pub applicability: RuleSet,
    pub requirements: RuleSet,
}

impl Specification {
    /// Create an empty specification with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SpecId::new(),
            name: name.into(),
            ifc_version: DEFAULT_IFC_VERSION.to_string(),
            applicability: RuleSet::new(),
            requirements: RuleSet::new(),
        }
    }

    /// Total number of rules in both sections
    pub fn rule_count(&self) -> usize {
        self.applicability.len() + self.requirements.len()
    }

    /// Deep copy under a fresh id
    pub fn duplicate(&self) -> Self {
        Self {
            id: SpecId::new(),
            ..self.clone()
        }
    }

    pub fn eq_ignoring_id(&self, other: &Specification) -> bool {
        self.name == other.name
            && self.ifc_version == other.ifc_version
            && self.applicability == other.applicability
            && self.requirements == other.requirements
    }
}

/// Ordered sequence of rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: impl Into<Rule>) {
        self.rules.push(rule.into());
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Rule> {
        self.rules.get_mut(index)
    }

    /// Remove the rule at `index`, if present
    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        if index < self.rules.len() {
            Some(self.rules.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// A rule, by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Rule {
    Entity(EntityRule),
    Property(PropertyRule),
}

impl From<EntityRule> for Rule {
    fn from(rule: EntityRule) -> Self {
        Rule::Entity(rule)
    }
}

impl From<PropertyRule> for Rule {
    fn from(rule: PropertyRule) -> Self {
        Rule::Property(rule)
    }
}

/// Selects model elements by IFC type name (always `name` equals value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRule {
    pub value: String,
}

impl EntityRule {
    pub const FIELD: &'static str = "name";

    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn condition(&self) -> Condition {
        Condition::Equals
    }
}

/// Whether a requirement is mandatory, optional, or forbidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Required,
    #[default]
    Optional,
    Prohibited,
}

impl Cardinality {
    pub const ALL: [Cardinality; 3] = [
        Cardinality::Required,
        Cardinality::Optional,
        Cardinality::Prohibited,
    ];

    /// Canonical XML attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Required => "required",
            Cardinality::Optional => "optional",
            Cardinality::Prohibited => "prohibited",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property data type.
///
/// Unknown type names are carried through unchanged in [`DataType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    Text,
    Integer,
    Real,
    Boolean,
    Other(String),
}

impl DataType {
    /// Map an attribute value; anything unknown is kept verbatim
    pub fn from_attr(value: &str) -> Self {
        match value {
            "IFCTEXT" => DataType::Text,
            "IFCINTEGER" => DataType::Integer,
            "IFCREAL" => DataType::Real,
            "IFCBOOLEAN" => DataType::Boolean,
            other => DataType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DataType::Text => "IFCTEXT",
            DataType::Integer => "IFCINTEGER",
            DataType::Real => "IFCREAL",
            DataType::Boolean => "IFCBOOLEAN",
            DataType::Other(name) => name,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Comparison a property rule expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    #[default]
    Equals,
    StartsWith,
    Contains,
    EndsWith,
    #[serde(rename = "in")]
    OneOf,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Equals,
        Condition::StartsWith,
        Condition::Contains,
        Condition::EndsWith,
        Condition::OneOf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Equals => "equals",
            Condition::StartsWith => "startsWith",
            Condition::Contains => "contains",
            Condition::EndsWith => "endsWith",
            Condition::OneOf => "in",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Equals => "Equals",
            Condition::StartsWith => "Starts with",
            Condition::Contains => "Contains",
            Condition::EndsWith => "Ends with",
            Condition::OneOf => "One of",
        }
    }

    /// True if values for this condition are enumerations
    pub fn takes_enumeration(&self) -> bool {
        matches!(self, Condition::OneOf)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a property rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValueExpr {
    Literal(String),
    Enumeration(Vec<String>),
}

impl ValueExpr {
    pub fn literal(text: impl Into<String>) -> Self {
        ValueExpr::Literal(text.into())
    }

    pub fn enumeration<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValueExpr::Enumeration(items.into_iter().map(Into::into).collect())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueExpr::Literal(_) => "literal",
            ValueExpr::Enumeration(_) => "enumeration",
        }
    }

    /// Whether this value representation pairs with `condition`
    pub fn fits(&self, condition: Condition) -> bool {
        matches!(self, ValueExpr::Enumeration(_)) == condition.takes_enumeration()
    }

    /// Convert to the representation `condition` requires.
    ///
    /// A non-empty literal becomes a one-item enumeration; an enumeration
    /// collapses to its first item (or the empty string).
    pub fn convert_for(self, condition: Condition) -> ValueExpr {
        match (self, condition.takes_enumeration()) {
            (ValueExpr::Literal(text), true) => {
                if text.is_empty() {
                    ValueExpr::Enumeration(Vec::new())
                } else {
                    ValueExpr::Enumeration(vec![text])
                }
            }
            (ValueExpr::Enumeration(items), false) => {
                ValueExpr::Literal(items.into_iter().next().unwrap_or_default())
            }
            (value, _) => value,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            ValueExpr::Literal(text) => Some(text),
            ValueExpr::Enumeration(_) => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&[String]> {
        match self {
            ValueExpr::Literal(_) => None,
            ValueExpr::Enumeration(items) => Some(items),
        }
    }
}

impl Default for ValueExpr {
    fn default() -> Self {
        ValueExpr::Literal(String::new())
    }
}

/// Constraint on a named property of the selected elements.
///
/// `condition` and `value` are private so the pairing invariant
/// (`OneOf` iff `Enumeration`) holds after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRule {
    pub property_set: String,
    /// Property base name
    pub field: String,
    pub data_type: DataType,
    pub cardinality: Cardinality,
    condition: Condition,
    value: ValueExpr,
}

impl PropertyRule {
    /// Text-typed, optional rule requiring the empty string
    pub fn new(property_set: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            property_set: property_set.into(),
            field: field.into(),
            data_type: DataType::default(),
            cardinality: Cardinality::default(),
            condition: Condition::Equals,
            value: ValueExpr::default(),
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Set condition and value together, rejecting a mismatched pair
    pub fn with_value(mut self, condition: Condition, value: ValueExpr) -> Result<Self, ModelError> {
        if !value.fits(condition) {
            return Err(ModelError::ConditionMismatch {
                condition,
                found: value.kind_name(),
            });
        }
        self.condition = condition;
        self.value = value;
        Ok(self)
    }

    /// Codec-internal constructor; the pair comes from a codec that only yields matching pairs
    pub(crate) fn with_decoded_value(mut self, condition: Condition, value: ValueExpr) -> Self {
        debug_assert!(value.fits(condition));
        self.condition = condition;
        self.value = value.convert_for(condition);
        self
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn value(&self) -> &ValueExpr {
        &self.value
    }

    /// Switch condition, converting the value representation as needed
    pub fn set_condition(&mut self, condition: Condition) {
        let value = mem::take(&mut self.value);
        self.value = value.convert_for(condition);
        self.condition = condition;
    }

    /// Replace the literal value; fails for `OneOf` rules
    pub fn set_literal(&mut self, text: impl Into<String>) -> Result<(), ModelError> {
        match &mut self.value {
            ValueExpr::Literal(current) => {
                *current = text.into();
                Ok(())
            }
            ValueExpr::Enumeration(_) => Err(ModelError::ConditionMismatch {
                condition: self.condition,
                found: "literal",
            }),
        }
    }

    /// Enumeration items of a `OneOf` rule
    pub fn enumeration_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.value {
            ValueExpr::Enumeration(items) => Some(items),
            ValueExpr::Literal(_) => None,
        }
    }
}
