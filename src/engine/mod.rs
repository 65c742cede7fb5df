use crate::form::{ApiConfig, FormConfig, FormState, Rule, RuleAction, RuleEvent};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

mod dispatch;

use dispatch::{apply_action, build_params};

/// A remote option load requested by a `populateOptions` rule. The engine
/// only describes the request; running it is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub target_field_id: String,
    pub api_config: ApiConfig,
    /// Remote parameter name -> stringified local value.
    pub params: IndexMap<String, String>,
}

/// The outcome of one rule pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The new form state with every synchronous effect applied.
    pub state: FormState,
    /// Option loads to run after the pass, in rule order.
    pub pending_fetches: Vec<FetchRequest>,
    /// Indexes into `config.rules` of the rules that fired.
    pub applied: Vec<usize>,
}

/// Runs one rule pass for a change of `changed_field_id` to `new_value`.
///
/// The new value is written first, then every rule is visited in stored
/// order against the same evolving state, so a later rule observes what an
/// earlier rule wrote and the last writer wins. Misconfigured rules
/// (dangling ids, missing `apiConfig`, unknown actions) are skipped without
/// error. `state` itself is never modified.
///
/// # Example
///
/// ```rust
/// use formrule::prelude::*;
/// use serde_json::json;
///
/// let config = FormConfig::new(
///     vec![Field::new("subscribe", FieldType::Checkbox), Field::new("email", FieldType::Email).hidden()],
///     vec![Rule::on_change("subscribe", RuleAction::Show, "email")],
/// );
/// let result = evaluate(&config, &FormState::initial(&config), "subscribe", json!(true));
/// assert!(result.state.is_visible("email"));
/// ```
pub fn evaluate(
    config: &FormConfig,
    state: &FormState,
    changed_field_id: &str,
    new_value: Value,
) -> Evaluation {
    let mut next = state.clone();
    next.values
        .insert(changed_field_id.to_string(), new_value.clone());

    let mut pending_fetches = Vec::new();
    let mut applied = Vec::new();

    for (index, rule) in config.rules.iter().enumerate() {
        if !is_eligible(config, rule, changed_field_id) {
            continue;
        }

        if rule.action == RuleAction::PopulateOptions {
            let Some(api_config) = &rule.api_config else {
                log::debug!("Rule #{} ({}) has no apiConfig, skipping", index, rule);
                continue;
            };
            pending_fetches.push(FetchRequest {
                target_field_id: rule.target_field_id.clone(),
                api_config: api_config.clone(),
                params: build_params(api_config, &next, &new_value),
            });
            applied.push(index);
            continue;
        }

        if apply_action(&mut next, rule) {
            log::debug!("Applied rule #{}: {}", index, rule);
            applied.push(index);
        } else {
            log::debug!("Ignoring rule #{} with unknown action '{}'", index, rule.action);
        }
    }

    Evaluation {
        state: next,
        pending_fetches,
        applied,
    }
}

/// Source id, event and optional type guard must all match the change.
fn is_eligible(config: &FormConfig, rule: &Rule, changed_field_id: &str) -> bool {
    if rule.source_field_id != changed_field_id || rule.event != RuleEvent::Change {
        return false;
    }
    match &rule.source_field_type {
        None => true,
        Some(guard) => config
            .field(changed_field_id)
            .is_some_and(|field| &field.field_type == guard),
    }
}
