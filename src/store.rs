//! The authoritative owner of a live form: configuration, runtime state and
//! the option lists loaded for each field.
//!
//! Rule passes are applied synchronously and replace the state as a whole.
//! Option loads run as tokio tasks and report back over a channel; merging a
//! result only ever touches the option list of the field it was issued for.

use crate::engine::{FetchRequest, evaluate};
use crate::form::{FieldOption, FormConfig, FormState};
use crate::persist::PersistedForm;
use crate::remote::{OptionSource, load_options};
use ahash::{AHashMap, AHashSet};
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Message sent back by a finished option load.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsLoaded {
    pub target_field_id: String,
    pub request_id: u64,
    /// `None` when the fetch failed.
    pub options: Option<Vec<FieldOption>>,
}

/// What a single change event did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatched {
    /// Indexes of the rules that fired, in order.
    pub applied: Vec<usize>,
    /// Request ids of the option loads started by this event.
    pub requests: Vec<u64>,
}

/// How a completed load was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    /// The fetch failed; existing options were kept.
    Failed,
    /// A newer request for the same field was issued after this one.
    Stale,
}

pub struct FormStore {
    config: FormConfig,
    state: FormState,
    options: AHashMap<String, Vec<FieldOption>>,
    source: Arc<dyn OptionSource>,
    latest_request: AHashMap<String, u64>,
    next_request_id: u64,
    /// Request ids issued but not yet received back.
    outstanding: AHashSet<u64>,
    tx: UnboundedSender<OptionsLoaded>,
    rx: UnboundedReceiver<OptionsLoaded>,
}

impl FormStore {
    pub fn new(config: FormConfig, source: Arc<dyn OptionSource>) -> Self {
        let state = FormState::initial(&config);
        Self::with_state(config, state, source)
    }

    /// Builds a store around an existing state, e.g. one restored from storage.
    pub fn with_state(config: FormConfig, state: FormState, source: Arc<dyn OptionSource>) -> Self {
        let (tx, rx) = unbounded_channel();
        let options = seed_options(&config);
        Self {
            config,
            state,
            options,
            source,
            latest_request: AHashMap::new(),
            next_request_id: 0,
            outstanding: AHashSet::new(),
            tx,
            rx,
        }
    }

    /// Restores a store from a persisted record. Saved values are laid over
    /// the configuration's initial state.
    pub fn from_persisted(record: PersistedForm, source: Arc<dyn OptionSource>) -> Self {
        let mut state = FormState::initial(&record.config);
        state.values.extend(record.form_state);
        Self::with_state(record.config, state, source)
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Current options of a field; empty for unknown fields.
    pub fn options(&self, field_id: &str) -> &[FieldOption] {
        self.options
            .get(field_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of option loads that have not been merged yet.
    pub fn in_flight(&self) -> usize {
        self.outstanding.len()
    }

    /// Handles a user edit of `field_id`: runs one rule pass, swaps in the
    /// resulting state and starts any option loads it requested.
    pub fn dispatch_change(&mut self, field_id: &str, value: Value) -> Dispatched {
        let evaluation = evaluate(&self.config, &self.state, field_id, value);
        self.state = evaluation.state;

        let requests = evaluation
            .pending_fetches
            .into_iter()
            .filter_map(|request| self.spawn_load(request))
            .collect();

        Dispatched {
            applied: evaluation.applied,
            requests,
        }
    }

    fn spawn_load(&mut self, request: FetchRequest) -> Option<u64> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!(
                    "No async runtime available, dropping option load for '{}'",
                    request.target_field_id
                );
                return None;
            }
        };

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.latest_request
            .insert(request.target_field_id.clone(), request_id);
        self.outstanding.insert(request_id);

        log::debug!(
            "Loading options for '{}' (request {}) from {}",
            request.target_field_id,
            request_id,
            request.api_config.url
        );

        let source = Arc::clone(&self.source);
        let mut reply = ReplyGuard {
            tx: self.tx.clone(),
            loaded: Some(OptionsLoaded {
                target_field_id: request.target_field_id.clone(),
                request_id,
                options: None,
            }),
        };
        handle.spawn(async move {
            let options = load_options(source.as_ref(), &request).await;
            if let Some(loaded) = reply.loaded.as_mut() {
                loaded.options = options;
            }
        });

        Some(request_id)
    }

    /// Merges every load that has already finished, without waiting.
    /// Returns how many results were received.
    pub fn apply_pending(&mut self) -> usize {
        let mut received = 0;
        while let Ok(loaded) = self.rx.try_recv() {
            self.merge(loaded);
            received += 1;
        }
        received
    }

    /// Waits until every started load has finished and been merged.
    pub async fn settle(&mut self) {
        while !self.outstanding.is_empty() {
            match self.rx.recv().await {
                Some(loaded) => {
                    self.merge(loaded);
                }
                None => break,
            }
        }
    }

    /// Applies one finished load. Only the options of
    /// `loaded.target_field_id` can change.
    pub fn merge(&mut self, loaded: OptionsLoaded) -> MergeOutcome {
        self.outstanding.remove(&loaded.request_id);

        let is_latest = self.latest_request.get(&loaded.target_field_id) == Some(&loaded.request_id);
        if !is_latest {
            log::debug!(
                "Discarding stale options for '{}' (request {})",
                loaded.target_field_id,
                loaded.request_id
            );
            return MergeOutcome::Stale;
        }

        match loaded.options {
            Some(options) => {
                log::info!(
                    "Loaded {} option(s) for '{}'",
                    options.len(),
                    loaded.target_field_id
                );
                self.options.insert(loaded.target_field_id, options);
                MergeOutcome::Applied
            }
            None => {
                log::debug!(
                    "Option load for '{}' failed, keeping existing options",
                    loaded.target_field_id
                );
                MergeOutcome::Failed
            }
        }
    }

    /// Applies an editor change to the configuration. Runtime state is kept,
    /// except that it is reset when the configuration ends up empty.
    /// Fields whose configured options were edited take the new list; fields
    /// that no longer exist lose their options and pending loads.
    pub fn edit_config<R>(&mut self, edit: impl FnOnce(&mut FormConfig) -> R) -> R {
        let before = seed_options(&self.config);
        let result = edit(&mut self.config);
        if self.config.is_empty() {
            self.reset_runtime();
            return result;
        }

        for field in &self.config.fields {
            if before.get(&field.id) != Some(&field.options) {
                self.options.insert(field.id.clone(), field.options.clone());
            }
        }
        let live: AHashSet<&str> = self.config.fields.iter().map(|f| f.id.as_str()).collect();
        self.options.retain(|id, _| live.contains(id.as_str()));
        self.latest_request.retain(|id, _| {
            let keep = live.contains(id.as_str());
            if !keep {
                log::debug!("Dropping pending option load for removed field '{}'", id);
            }
            keep
        });
        result
    }

    /// Clears configuration and state. Loads still in flight become stale.
    pub fn reset(&mut self) {
        self.config.clear();
        self.reset_runtime();
    }

    fn reset_runtime(&mut self) {
        self.state.reset();
        self.options.clear();
        self.latest_request.clear();
    }

    /// Captures the configuration and field values for persistence.
    pub fn snapshot(&self) -> PersistedForm {
        PersistedForm::new(self.config.clone(), self.state.values.clone())
    }
}

/// Sends the load result when the task ends, including when the option
/// source panicked and the task is torn down before finishing.
struct ReplyGuard {
    tx: UnboundedSender<OptionsLoaded>,
    loaded: Option<OptionsLoaded>,
}

impl Drop for ReplyGuard {
    fn drop(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            // The store may have been dropped in the meantime.
            let _ = self.tx.send(loaded);
        }
    }
}

fn seed_options(config: &FormConfig) -> AHashMap<String, Vec<FieldOption>> {
    config
        .fields
        .iter()
        .map(|field| (field.id.clone(), field.options.clone()))
        .collect()
}
