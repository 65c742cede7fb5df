//! Loading option lists from remote JSON endpoints.

mod extract;
mod fetch;

pub use extract::extract_options;
pub use fetch::fetch_json;

use crate::engine::FetchRequest;
use crate::error::FetchError;
use crate::form::FieldOption;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Default per-request timeout for [`HttpOptionSource`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can answer a [`FetchRequest`] with a JSON payload.
///
/// Implementations must not fail: any problem is reported as `None`.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Option<Value>;
}

/// Fetches the payload for `request` and extracts its options.
///
/// Returns `None` when the fetch itself failed, so callers can keep whatever
/// options the field already had. A successful fetch whose payload holds no
/// options yields `Some(vec![])`.
pub async fn load_options(
    source: &dyn OptionSource,
    request: &FetchRequest,
) -> Option<Vec<FieldOption>> {
    let payload = source.fetch(request).await?;
    let api = &request.api_config;
    Some(extract_options(
        Some(&payload),
        api.response_path.as_deref(),
        api.label_key.as_deref(),
        api.value_key.as_deref(),
    ))
}

/// [`OptionSource`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpOptionSource {
    client: Client,
}

impl HttpOptionSource {
    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    pub fn builder() -> HttpOptionSourceBuilder {
        HttpOptionSourceBuilder {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Wraps an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OptionSource for HttpOptionSource {
    async fn fetch(&self, request: &FetchRequest) -> Option<Value> {
        let api = &request.api_config;
        fetch_json(
            &self.client,
            &api.url,
            &api.method,
            Some(&request.params),
            api.body.as_ref(),
        )
        .await
    }
}

/// Builder for [`HttpOptionSource`].
pub struct HttpOptionSourceBuilder {
    timeout: Duration,
}

impl HttpOptionSourceBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpOptionSource, FetchError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(HttpOptionSource { client })
    }
}
