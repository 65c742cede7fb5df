use super::field::Field;
use super::rule::Rule;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// The persisted form definition: an ordered list of fields and an ordered
/// list of rules. Rule order is significant, see [`crate::engine::evaluate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl FormConfig {
    pub fn new(fields: Vec<Field>, rules: Vec<Rule>) -> Self {
        Self { fields, rules }
    }

    /// Parses a configuration from the editor's JSON format.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Replaces the field with the same id in place, or appends it.
    pub fn upsert_field(&mut self, field: Field) -> Result<(), ConfigError> {
        if field.id.is_empty() {
            return Err(ConfigError::EmptyFieldId);
        }
        match self.fields.iter().position(|f| f.id == field.id) {
            Some(idx) => self.fields[idx] = field,
            None => self.fields.push(field),
        }
        Ok(())
    }

    /// Removes the field and every rule that reads from or writes to it.
    /// Returns the removed field, if it existed.
    pub fn delete_field(&mut self, id: &str) -> Option<Field> {
        let before = self.rules.len();
        self.rules.retain(|rule| !rule.references(id));
        let dropped = before - self.rules.len();
        if dropped > 0 {
            log::debug!("Dropped {} rule(s) referencing deleted field '{}'", dropped, id);
        }
        let idx = self.fields.iter().position(|f| f.id == id)?;
        Some(self.fields.remove(idx))
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn replace_rule(&mut self, index: usize, rule: Rule) -> Result<Rule, ConfigError> {
        let len = self.rules.len();
        let slot = self
            .rules
            .get_mut(index)
            .ok_or(ConfigError::RuleIndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, rule))
    }

    pub fn delete_rule(&mut self, index: usize) -> Result<Rule, ConfigError> {
        if index >= self.rules.len() {
            return Err(ConfigError::RuleIndexOutOfBounds {
                index,
                len: self.rules.len(),
            });
        }
        Ok(self.rules.remove(index))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.rules.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.rules.is_empty()
    }
}
