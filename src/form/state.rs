use super::config::FormConfig;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Runtime state of a filled-in form. Owned by the caller and replaced
/// wholesale after every rule pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    #[serde(default)]
    pub values: AHashMap<String, Value>,
    #[serde(default)]
    pub visible_fields: AHashSet<String>,
    #[serde(default)]
    pub disabled_fields: AHashSet<String>,
}

impl FormState {
    /// Seeds the state from a configuration: every field flagged `visible`
    /// starts visible and every non-null default value is pre-filled.
    pub fn initial(config: &FormConfig) -> Self {
        let mut state = Self::default();
        for field in &config.fields {
            if field.visible {
                state.visible_fields.insert(field.id.clone());
            }
            if !field.default_value.is_null() {
                state
                    .values
                    .insert(field.id.clone(), field.default_value.clone());
            }
        }
        state
    }

    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    pub fn is_visible(&self, field_id: &str) -> bool {
        self.visible_fields.contains(field_id)
    }

    pub fn is_disabled(&self, field_id: &str) -> bool {
        self.disabled_fields.contains(field_id)
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.visible_fields.clear();
        self.disabled_fields.clear();
    }
}
