use super::field::FieldType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The trigger a rule listens for. Only `change` exists today; anything else
/// is preserved but never fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleEvent {
    #[default]
    Change,
    Other(String),
}

impl From<String> for RuleEvent {
    fn from(name: String) -> Self {
        match name.as_str() {
            "change" => RuleEvent::Change,
            _ => RuleEvent::Other(name),
        }
    }
}

impl From<RuleEvent> for String {
    fn from(event: RuleEvent) -> Self {
        match event {
            RuleEvent::Change => "change".to_string(),
            RuleEvent::Other(name) => name,
        }
    }
}

/// The effect a rule has on its target field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleAction {
    Show,
    Hide,
    Enable,
    Disable,
    SetValue,
    Toggle,
    PopulateOptions,
    /// An action this engine does not know. Ignored during evaluation.
    Other(String),
}

impl RuleAction {
    pub fn as_str(&self) -> &str {
        match self {
            RuleAction::Show => "show",
            RuleAction::Hide => "hide",
            RuleAction::Enable => "enable",
            RuleAction::Disable => "disable",
            RuleAction::SetValue => "setValue",
            RuleAction::Toggle => "toggle",
            RuleAction::PopulateOptions => "populateOptions",
            RuleAction::Other(name) => name,
        }
    }
}

impl From<String> for RuleAction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "show" => RuleAction::Show,
            "hide" => RuleAction::Hide,
            "enable" => RuleAction::Enable,
            "disable" => RuleAction::Disable,
            "setValue" => RuleAction::SetValue,
            "toggle" => RuleAction::Toggle,
            "populateOptions" => RuleAction::PopulateOptions,
            _ => RuleAction::Other(name),
        }
    }
}

impl From<RuleAction> for String {
    fn from(action: RuleAction) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how a `populateOptions` rule loads its choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// Local field id -> remote query parameter name, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_mapping: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Dot path to the array of options inside the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_key: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ApiConfig {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            param_mapping: None,
            body: None,
            response_path: None,
            label_key: None,
            value_key: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_param(mut self, local_field_id: impl Into<String>, remote_name: impl Into<String>) -> Self {
        self.param_mapping
            .get_or_insert_with(IndexMap::new)
            .insert(local_field_id.into(), remote_name.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_response_path(mut self, path: impl Into<String>) -> Self {
        self.response_path = Some(path.into());
        self
    }

    pub fn with_keys(mut self, label_key: impl Into<String>, value_key: impl Into<String>) -> Self {
        self.label_key = Some(label_key.into());
        self.value_key = Some(value_key.into());
        self
    }
}

/// A declarative reaction: when `source_field_id` fires `event`, apply
/// `action` to `target_field_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub source_field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field_type: Option<FieldType>,
    #[serde(default)]
    pub event: RuleEvent,
    pub action: RuleAction,
    pub target_field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_config: Option<ApiConfig>,
}

impl Rule {
    /// A `change` rule without type guard, impact or API configuration.
    pub fn on_change(
        source_field_id: impl Into<String>,
        action: RuleAction,
        target_field_id: impl Into<String>,
    ) -> Self {
        Self {
            source_field_id: source_field_id.into(),
            source_field_type: None,
            event: RuleEvent::Change,
            action,
            target_field_id: target_field_id.into(),
            impact: None,
            api_config: None,
        }
    }

    pub fn guarded_by(mut self, field_type: FieldType) -> Self {
        self.source_field_type = Some(field_type);
        self
    }

    pub fn with_impact(mut self, impact: serde_json::Value) -> Self {
        self.impact = Some(impact);
        self
    }

    pub fn with_api(mut self, api_config: ApiConfig) -> Self {
        self.api_config = Some(api_config);
        self
    }

    /// True when either end of the rule points at `field_id`.
    pub fn references(&self, field_id: &str) -> bool {
        self.source_field_id == field_id || self.target_field_id == field_id
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event: String = self.event.clone().into();
        write!(
            f,
            "When {} {}, {} {}",
            self.source_field_id, event, self.action, self.target_field_id
        )
    }
}
