//! Common test utilities for building form configurations, mock option
//! sources and one-shot HTTP servers.
use async_trait::async_trait;
use formrule::prelude::*;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::io::Read;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

/// Country / state / city form with a mix of synchronous and remote rules.
///
/// - `country` change: show `state`, enable `city`, load `city` options.
/// - `newsletter` (checkbox) change: toggle `consent`, show `email`.
#[allow(dead_code)]
pub fn create_address_config(url: &str) -> FormConfig {
    FormConfig::new(
        vec![
            Field::new("country", FieldType::Select).with_default(json!("")),
            Field::new("state", FieldType::Text).hidden(),
            Field::new("city", FieldType::Select),
            Field::new("newsletter", FieldType::Checkbox),
            Field::new("consent", FieldType::Checkbox),
            Field::new("email", FieldType::Email).hidden(),
        ],
        vec![
            Rule::on_change("country", RuleAction::Show, "state"),
            Rule::on_change("country", RuleAction::Enable, "city"),
            Rule::on_change("country", RuleAction::PopulateOptions, "city").with_api(
                ApiConfig::get(url)
                    .with_param("country", "country")
                    .with_response_path("data.cities"),
            ),
            Rule::on_change("newsletter", RuleAction::Toggle, "consent")
                .guarded_by(FieldType::Checkbox),
            Rule::on_change("newsletter", RuleAction::Show, "email"),
        ],
    )
}

/// Two fields and whatever rules the test needs, all sourced from `a`.
#[allow(dead_code)]
pub fn create_pair_config(rules: Vec<Rule>) -> FormConfig {
    FormConfig::new(
        vec![
            Field::new("a", FieldType::Text),
            Field::new("b", FieldType::Text),
        ],
        rules,
    )
}

/// An option source that answers from a queue of canned payloads, optionally
/// after a per-response delay, and records every request it saw.
#[allow(dead_code)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<(Duration, Option<Value>)>>,
    keyed: Mutex<Vec<(String, String, Duration, Option<Value>)>>,
    pub seen: Mutex<Vec<FetchRequest>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            keyed: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, payload: Option<Value>) -> Self {
        self.respond_after(Duration::ZERO, payload)
    }

    pub fn respond_after(self, delay: Duration, payload: Option<Value>) -> Self {
        self.responses.lock().unwrap().push_back((delay, payload));
        self
    }

    /// Answers requests whose `param` equals `value`, ahead of the queue.
    pub fn respond_when(self, param: &str, value: &str, delay: Duration, payload: Option<Value>) -> Self {
        self.keyed
            .lock()
            .unwrap()
            .push((param.to_string(), value.to_string(), delay, payload));
        self
    }

    pub fn seen(&self) -> Vec<FetchRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl OptionSource for ScriptedSource {
    async fn fetch(&self, request: &FetchRequest) -> Option<Value> {
        self.seen.lock().unwrap().push(request.clone());
        let keyed = self
            .keyed
            .lock()
            .unwrap()
            .iter()
            .find(|(param, value, _, _)| request.params.get(param) == Some(value))
            .map(|(_, _, delay, payload)| (*delay, payload.clone()));
        let next = keyed.or_else(|| self.responses.lock().unwrap().pop_front());
        let (delay, payload) = next.unwrap_or((Duration::ZERO, None));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        payload
    }
}

/// What the one-shot server received.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct Captured {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// Starts a server that answers exactly one request with `status` and `body`.
/// Returns the base URL and a handle yielding what was received.
#[allow(dead_code)]
pub fn serve_once(status: u16, body: &str) -> (String, thread::JoinHandle<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");
    let body = body.to_string();

    let handle = thread::spawn(move || {
        let mut captured = Captured::default();
        if let Ok(mut request) = server.recv() {
            captured.method = request.method().to_string();
            captured.url = request.url().to_string();
            captured.content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.as_str().to_string());
            let _ = request.as_reader().read_to_string(&mut captured.body);

            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
        captured
    });

    (url, handle)
}
