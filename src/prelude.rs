//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! formrule crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use formrule::prelude::*;
//! use serde_json::json;
//!
//! # fn run_example() -> Result<()> {
//! let config = FormConfig::from_json(&std::fs::read_to_string("path/to/form.json")?)?;
//! let state = FormState::initial(&config);
//!
//! let result = evaluate(&config, &state, "newsletter", json!(true));
//! println!("Visible: {:?}", result.state.visible_fields);
//! println!("Pending option loads: {}", result.pending_fetches.len());
//! # Ok(())
//! # }
//! ```

// Configuration model and runtime state
pub use crate::form::{
    ApiConfig, Field, FieldOption, FieldType, FormConfig, FormState, Rule, RuleAction, RuleEvent,
};

// Rule evaluation
pub use crate::engine::{Evaluation, FetchRequest, evaluate};

// Remote options
pub use crate::remote::{HttpOptionSource, OptionSource, extract_options, fetch_json, load_options};

// Live store and persistence
pub use crate::persist::{FileStore, KeyValueStore, MemoryStore, PersistedForm};
pub use crate::store::{Dispatched, FormStore, MergeOutcome, OptionsLoaded};

// Error types
pub use crate::error::{ConfigError, FetchError, StoreError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
