//! # formrule - Reactive Rule Engine for Dynamic Forms
//!
//! **formrule** evaluates user-authored form rules. A form is described by a
//! [`FormConfig`](form::FormConfig): an ordered list of fields and an ordered
//! list of rules such as "when `country` changes, show `state`" or "when
//! `country` changes, load the options of `city` from this endpoint".
//!
//! ## Core Workflow
//!
//! 1.  **Describe the form**: build or deserialize a `FormConfig` from the editor's JSON.
//! 2.  **Evaluate changes**: call [`evaluate`](engine::evaluate) with the current
//!     [`FormState`](form::FormState) and the field that changed. It returns the next state
//!     (visibility, enablement, values) and the option loads the pass requested.
//! 3.  **Load options**: hand the `FetchRequest`s to an [`OptionSource`](remote::OptionSource).
//!     The bundled [`HttpOptionSource`](remote::HttpOptionSource) calls the endpoint and
//!     [`extract_options`](remote::extract_options) turns the JSON into `{label, value}` pairs.
//!
//! [`FormStore`](store::FormStore) wires all of this together: it owns the live state,
//! runs loads as tokio tasks and merges their results back field by field.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formrule::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = FormConfig::from_json(r#"{
//!         "fields": [
//!             {"id": "country", "label": "Country", "type": "select", "defaultValue": "", "visible": true, "options": []},
//!             {"id": "city", "label": "City", "type": "select", "defaultValue": "", "visible": false, "options": []}
//!         ],
//!         "rules": [
//!             {"sourceFieldId": "country", "event": "change", "action": "show", "targetFieldId": "city"},
//!             {"sourceFieldId": "country", "event": "change", "action": "populateOptions", "targetFieldId": "city",
//!              "apiConfig": {"url": "https://example.com/cities", "method": "GET",
//!                            "paramMapping": {"country": "country"}, "responsePath": "data"}}
//!         ]
//!     }"#)?;
//!
//!     let mut store = FormStore::new(config, Arc::new(HttpOptionSource::new()?));
//!     store.dispatch_change("country", json!("DE"));
//!     assert!(store.state().is_visible("city"));
//!
//!     store.settle().await;
//!     for option in store.options("city") {
//!         println!("{} = {}", option.label, option.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod form;
pub mod persist;
pub mod prelude;
pub mod remote;
pub mod store;
pub mod value;
