//! Editing session
//!
//! [`EditorSession`] owns the document being edited and the current
//! selection. Every mutation goes through it, so rules keep their
//! condition/value pairing no matter which form control changed them.

use crate::config::EditorConfig;
use crate::decoder::{self, ParseError};
use crate::encoder::Encoder;
use crate::model::{
    today, Cardinality, Condition, DataType, Document, EntityRule, Info, ModelError,
    PropertyRule, Rule, RuleSet, SpecId, Specification,
};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No specification with id {0}")]
    UnknownSpecification(SpecId),
    #[error("No {section} rule at index {index}")]
    RuleOutOfRange { section: Section, index: usize },
    #[error("Rule {index} is not a property rule")]
    NotAPropertyRule { index: usize },
    #[error("Rule {index} is not an entity rule")]
    NotAnEntityRule { index: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Rule set of a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Applicability,
    Requirements,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Applicability => f.write_str("applicability"),
            Section::Requirements => f.write_str("requirements"),
        }
    }
}

/// A single user's editing state
#[derive(Debug, Clone)]
pub struct EditorSession {
    document: Document,
    selected: Option<SpecId>,
    config: EditorConfig,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start a session on a fresh document
    pub fn new(config: EditorConfig) -> Self {
        let document = fresh_document(&config);
        Self {
            document,
            selected: None,
            config,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn info_mut(&mut self) -> &mut Info {
        &mut self.document.info
    }

    /// Replace the document with a fresh one and clear the selection
    pub fn new_document(&mut self) {
        self.document = fresh_document(&self.config);
        self.selected = None;
    }

    /// Decode `source` into the session.
    ///
    /// On error the session is left as it was.
    pub fn load(&mut self, source: &str) -> Result<(), ParseError> {
        let document = decoder::parse(source)?;
        tracing::info!(
            specifications = document.specifications.len(),
            "document loaded"
        );
        self.document = document;
        self.selected = None;
        Ok(())
    }

    /// Encode the current document
    pub fn save(&self) -> String {
        Encoder::with_config(self.config.clone()).encode(&self.document)
    }

    /// Append a new specification with one default entity rule and select it
    pub fn add_specification(&mut self) -> SpecId {
        let mut spec = Specification::new(format!(
            "New specification {}",
            self.document.specifications.len() + 1
        ));
        spec.applicability
            .push(EntityRule::new(self.config.default_entity.clone()));

        let id = spec.id;
        self.document.specifications.push(spec);
        self.selected = Some(id);
        id
    }

    /// Append a deep copy of a specification; returns the copy's id
    pub fn duplicate_specification(&mut self, id: SpecId) -> Result<SpecId, SessionError> {
        let original = self
            .document
            .specification(id)
            .ok_or(SessionError::UnknownSpecification(id))?;

        let mut copy = original.duplicate();
        copy.name = format!("{} (copy)", original.name);

        let copy_id = copy.id;
        self.document.specifications.push(copy);
        Ok(copy_id)
    }

    pub fn delete_specification(&mut self, id: SpecId) -> Result<Specification, SessionError> {
        let position = self
            .document
            .specifications
            .iter()
            .position(|s| s.id == id)
            .ok_or(SessionError::UnknownSpecification(id))?;

        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.document.specifications.remove(position))
    }

    pub fn select(&mut self, id: SpecId) -> Result<(), SessionError> {
        if self.document.specification(id).is_none() {
            return Err(SessionError::UnknownSpecification(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn selected(&self) -> Option<SpecId> {
        self.selected
    }

    pub fn selected_specification(&self) -> Option<&Specification> {
        self.selected.and_then(|id| self.document.specification(id))
    }

    pub fn specification_mut(&mut self, id: SpecId) -> Result<&mut Specification, SessionError> {
        self.document
            .specification_mut(id)
            .ok_or(SessionError::UnknownSpecification(id))
    }

    pub fn rename_specification(
        &mut self,
        id: SpecId,
        name: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.specification_mut(id)?.name = name.into();
        Ok(())
    }

    /// Remove every rule from both sections
    pub fn clear_specification(&mut self, id: SpecId) -> Result<(), SessionError> {
        let spec = self.specification_mut(id)?;
        spec.applicability.clear();
        spec.requirements.clear();
        Ok(())
    }

    /// Append the default entity rule; returns its index
    pub fn add_applicability_rule(&mut self, id: SpecId) -> Result<usize, SessionError> {
        let entity = EntityRule::new(self.config.default_entity.clone());
        let rules = &mut self.specification_mut(id)?.applicability;
        rules.push(entity);
        Ok(rules.len() - 1)
    }

    /// Append an empty optional text property rule; returns its index
    pub fn add_requirement_rule(&mut self, id: SpecId) -> Result<usize, SessionError> {
        let rules = &mut self.specification_mut(id)?.requirements;
        rules.push(PropertyRule::new("", ""));
        Ok(rules.len() - 1)
    }

    pub fn remove_rule(
        &mut self,
        id: SpecId,
        section: Section,
        index: usize,
    ) -> Result<Rule, SessionError> {
        let spec = self.specification_mut(id)?;
        section_mut(spec, section)
            .remove(index)
            .ok_or(SessionError::RuleOutOfRange { section, index })
    }

    pub fn set_entity_value(
        &mut self,
        id: SpecId,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        let spec = self.specification_mut(id)?;
        match spec.applicability.get_mut(index) {
            Some(Rule::Entity(entity)) => {
                entity.value = value.into();
                Ok(())
            }
            Some(Rule::Property(_)) => Err(SessionError::NotAnEntityRule { index }),
            None => Err(SessionError::RuleOutOfRange {
                section: Section::Applicability,
                index,
            }),
        }
    }

    /// Change a requirement's condition, converting its value representation
    pub fn set_rule_condition(
        &mut self,
        id: SpecId,
        index: usize,
        condition: Condition,
    ) -> Result<(), SessionError> {
        self.property_rule_mut(id, index)?.set_condition(condition);
        Ok(())
    }

    pub fn set_property_field(
        &mut self,
        id: SpecId,
        index: usize,
        field: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.property_rule_mut(id, index)?.field = field.into();
        Ok(())
    }

    pub fn set_property_set(
        &mut self,
        id: SpecId,
        index: usize,
        property_set: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.property_rule_mut(id, index)?.property_set = property_set.into();
        Ok(())
    }

    pub fn set_data_type(
        &mut self,
        id: SpecId,
        index: usize,
        data_type: DataType,
    ) -> Result<(), SessionError> {
        self.property_rule_mut(id, index)?.data_type = data_type;
        Ok(())
    }

    pub fn set_cardinality(
        &mut self,
        id: SpecId,
        index: usize,
        cardinality: Cardinality,
    ) -> Result<(), SessionError> {
        self.property_rule_mut(id, index)?.cardinality = cardinality;
        Ok(())
    }

    /// Set the literal value of a non-`OneOf` requirement
    pub fn set_literal(
        &mut self,
        id: SpecId,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.property_rule_mut(id, index)?.set_literal(text)?;
        Ok(())
    }

    /// Append an item to a `OneOf` requirement's list
    pub fn push_enumeration_value(
        &mut self,
        id: SpecId,
        index: usize,
        item: impl Into<String>,
    ) -> Result<(), SessionError> {
        let rule = self.property_rule_mut(id, index)?;
        let condition = rule.condition();
        let items = rule.enumeration_mut().ok_or(ModelError::ConditionMismatch {
            condition,
            found: "enumeration",
        })?;
        items.push(item.into());
        Ok(())
    }

    /// Remove the item at `position` from a `OneOf` requirement's list
    pub fn remove_enumeration_value(
        &mut self,
        id: SpecId,
        index: usize,
        position: usize,
    ) -> Result<Option<String>, SessionError> {
        let rule = self.property_rule_mut(id, index)?;
        let condition = rule.condition();
        let items = rule.enumeration_mut().ok_or(ModelError::ConditionMismatch {
            condition,
            found: "enumeration",
        })?;
        Ok((position < items.len()).then(|| items.remove(position)))
    }

    fn property_rule_mut(
        &mut self,
        id: SpecId,
        index: usize,
    ) -> Result<&mut PropertyRule, SessionError> {
        let spec = self.specification_mut(id)?;
        match spec.requirements.get_mut(index) {
            Some(Rule::Property(rule)) => Ok(rule),
            Some(Rule::Entity(_)) => Err(SessionError::NotAPropertyRule { index }),
            None => Err(SessionError::RuleOutOfRange {
                section: Section::Requirements,
                index,
            }),
        }
    }
}

fn section_mut(spec: &mut Specification, section: Section) -> &mut RuleSet {
    match section {
        Section::Applicability => &mut spec.applicability,
        Section::Requirements => &mut spec.requirements,
    }
}

fn fresh_document(config: &EditorConfig) -> Document {
    Document {
        info: Info {
            title: config.default_title.clone(),
            copyright: config.default_copyright.clone(),
            author: config.default_author.clone(),
            date: today(),
            ..Info::default()
        },
        specifications: Vec::new(),
    }
}
