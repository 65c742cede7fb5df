use crate::form::{ApiConfig, FormState, Rule, RuleAction};
use crate::value::{is_truthy_opt, to_text};
use indexmap::IndexMap;
use serde_json::Value;

/// Applies a synchronous action to the evolving state.
/// Returns `false` for actions this engine does not handle here.
pub(super) fn apply_action(state: &mut FormState, rule: &Rule) -> bool {
    let target = &rule.target_field_id;
    match &rule.action {
        RuleAction::Show => {
            state.visible_fields.insert(target.clone());
        }
        RuleAction::Hide => {
            state.visible_fields.remove(target);
        }
        RuleAction::Enable => {
            state.disabled_fields.remove(target);
        }
        RuleAction::Disable => {
            state.disabled_fields.insert(target.clone());
        }
        RuleAction::SetValue => {
            let impact = rule.impact.clone().unwrap_or(Value::Null);
            state.values.insert(target.clone(), impact);
        }
        RuleAction::Toggle => {
            let flipped = !is_truthy_opt(state.values.get(target));
            state.values.insert(target.clone(), Value::Bool(flipped));
        }
        RuleAction::PopulateOptions | RuleAction::Other(_) => return false,
    }
    true
}

/// Resolves `paramMapping` against the current state. A local field with no
/// value yet falls back to the value that triggered the pass.
pub(super) fn build_params(
    api_config: &ApiConfig,
    state: &FormState,
    new_value: &Value,
) -> IndexMap<String, String> {
    let Some(mapping) = &api_config.param_mapping else {
        return IndexMap::new();
    };
    mapping
        .iter()
        .map(|(local_field_id, remote_name)| {
            let value = state
                .values
                .get(local_field_id)
                .filter(|v| !v.is_null())
                .unwrap_or(new_value);
            (remote_name.clone(), param_text(value))
        })
        .collect()
}

fn param_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => to_text(other),
    }
}
