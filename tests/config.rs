//! Tests for the form configuration model and its editor operations.
mod common;
use common::*;
use formrule::prelude::*;
use serde_json::json;

const EDITOR_JSON: &str = r#"{
    "fields": [
        {"id": "kind", "label": "Kind", "type": "select", "defaultValue": "a", "visible": true,
         "options": [{"label": "A", "value": "a"}, {"label": "B", "value": "b"}]},
        {"id": "extra", "label": "Extra", "type": "rating", "defaultValue": null, "visible": false, "options": []}
    ],
    "rules": [
        {"sourceFieldId": "kind", "sourceFieldType": "select", "event": "change", "action": "setValue",
         "targetFieldId": "extra", "impact": 5},
        {"sourceFieldId": "kind", "event": "change", "action": "populateOptions", "targetFieldId": "extra",
         "apiConfig": {"url": "http://localhost/x", "method": "POST",
                       "paramMapping": {"kind": "k", "extra": "e"}, "body": {"q": 1}}}
    ]
}"#;

#[test]
fn test_parses_editor_json() {
    let config = FormConfig::from_json(EDITOR_JSON).unwrap();
    assert_eq!(config.fields.len(), 2);
    assert_eq!(config.fields[0].field_type, FieldType::Select);
    assert_eq!(config.fields[0].options[1], FieldOption::new("B", "b"));
    assert_eq!(config.fields[1].field_type, FieldType::Other("rating".to_string()));

    let rule = &config.rules[0];
    assert_eq!(rule.action, RuleAction::SetValue);
    assert_eq!(rule.source_field_type, Some(FieldType::Select));
    assert_eq!(rule.impact, Some(json!(5)));

    let api = config.rules[1].api_config.as_ref().unwrap();
    assert_eq!(api.method, "POST");
    let mapping: Vec<_> = api.param_mapping.as_ref().unwrap().iter().collect();
    assert_eq!(mapping[0], (&"kind".to_string(), &"k".to_string()));
    assert_eq!(mapping[1], (&"extra".to_string(), &"e".to_string()));
}

#[test]
fn test_json_round_trip_keeps_unknown_names() {
    let config = FormConfig::from_json(EDITOR_JSON).unwrap();
    let json = config.to_json().unwrap();
    assert!(json.contains("\"rating\""));
    assert!(json.contains("\"defaultValue\""));
    assert!(json.contains("\"populateOptions\""));
    assert_eq!(FormConfig::from_json(&json).unwrap(), config);
}

#[test]
fn test_malformed_json_is_an_error() {
    let err = FormConfig::from_json("{\"fields\": 3}").unwrap_err();
    assert!(matches!(err, ConfigError::JsonParseError(_)));
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn test_api_method_defaults_to_get() {
    let rule: Rule = serde_json::from_value(json!({
        "sourceFieldId": "a", "event": "change", "action": "populateOptions",
        "targetFieldId": "b", "apiConfig": {"url": "http://localhost"}
    }))
    .unwrap();
    assert_eq!(rule.api_config.unwrap().method, "GET");
}

#[test]
fn test_upsert_field_replaces_in_place() {
    let mut config = create_pair_config(vec![]);
    config
        .upsert_field(Field::new("a", FieldType::Number).with_label("Renamed"))
        .unwrap();
    config.upsert_field(Field::new("c", FieldType::Text)).unwrap();

    let ids: Vec<_> = config.fields.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(config.field("a").unwrap().label, "Renamed");
    assert_eq!(config.field("a").unwrap().field_type, FieldType::Number);
}

#[test]
fn test_upsert_rejects_empty_id() {
    let mut config = FormConfig::default();
    let err = config.upsert_field(Field::new("", FieldType::Text)).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyFieldId));
}

#[test]
fn test_delete_field_cascades_to_rules() {
    let mut config = create_address_config("http://localhost");
    let removed = config.delete_field("country").unwrap();
    assert_eq!(removed.id, "country");
    assert!(config.field("country").is_none());
    assert_eq!(config.rules.len(), 2);
    assert!(config.rules.iter().all(|r| !r.references("country")));

    // Rules pointing at the field as a target go too.
    let removed = config.delete_field("email");
    assert!(removed.is_some());
    assert_eq!(config.rules.len(), 1);
}

#[test]
fn test_delete_unknown_field_still_drops_dangling_rules() {
    let mut config = create_pair_config(vec![
        Rule::on_change("a", RuleAction::Show, "ghost"),
        Rule::on_change("a", RuleAction::Show, "b"),
    ]);
    assert!(config.delete_field("ghost").is_none());
    assert_eq!(config.rules.len(), 1);
}

#[test]
fn test_rule_positional_edits() {
    let mut config = create_pair_config(vec![]);
    config.add_rule(Rule::on_change("a", RuleAction::Show, "b"));
    config.add_rule(Rule::on_change("a", RuleAction::Hide, "b"));
    config.add_rule(Rule::on_change("a", RuleAction::Disable, "b"));

    let old = config
        .replace_rule(1, Rule::on_change("a", RuleAction::Enable, "b"))
        .unwrap();
    assert_eq!(old.action, RuleAction::Hide);
    assert_eq!(config.rules[1].action, RuleAction::Enable);

    let deleted = config.delete_rule(0).unwrap();
    assert_eq!(deleted.action, RuleAction::Show);
    let actions: Vec<_> = config.rules.iter().map(|r| r.action.clone()).collect();
    assert_eq!(actions, vec![RuleAction::Enable, RuleAction::Disable]);
}

#[test]
fn test_rule_index_out_of_bounds() {
    let mut config = create_pair_config(vec![Rule::on_change("a", RuleAction::Show, "b")]);
    let err = config.delete_rule(3).unwrap_err();
    assert!(matches!(err, ConfigError::RuleIndexOutOfBounds { index: 3, len: 1 }));
    let err = config
        .replace_rule(1, Rule::on_change("a", RuleAction::Hide, "b"))
        .unwrap_err();
    assert!(err.to_string().contains("out of bounds"));
    assert_eq!(config.rules.len(), 1);
}

#[test]
fn test_clear_and_initial_state() {
    let mut config = create_address_config("http://localhost");
    let state = FormState::initial(&config);
    assert!(state.is_visible("country"));
    assert!(!state.is_visible("state"));
    assert!(!state.is_visible("email"));
    assert_eq!(state.value("country"), Some(&json!("")));
    assert!(state.value("city").is_none());

    config.clear();
    assert!(config.is_empty());
    assert_eq!(FormState::initial(&config), FormState::default());
}

#[test]
fn test_rule_display() {
    let rule = Rule::on_change("country", RuleAction::PopulateOptions, "city");
    assert_eq!(rule.to_string(), "When country change, populateOptions city");
}
