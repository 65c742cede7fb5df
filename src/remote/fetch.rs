use crate::error::FetchError;
use indexmap::IndexMap;
use reqwest::{Client, Method};
use serde_json::Value;

/// Performs an HTTP request and parses the JSON response.
///
/// Query parameters are appended for every method; a JSON body is only sent
/// when the method is not `GET`. Any failure (unknown method, transport
/// error, non-2xx status, unparsable body) is logged and reported as `None`.
pub async fn fetch_json(
    client: &Client,
    url: &str,
    method: &str,
    query_params: Option<&IndexMap<String, String>>,
    body: Option<&Value>,
) -> Option<Value> {
    match try_fetch_json(client, url, method, query_params, body).await {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Error fetching data: {}", e);
            None
        }
    }
}

async fn try_fetch_json(
    client: &Client,
    url: &str,
    method: &str,
    query_params: Option<&IndexMap<String, String>>,
    body: Option<&Value>,
) -> Result<Value, FetchError> {
    let method = parse_method(method)?;
    let mut request = client.request(method.clone(), url);

    if let Some(params) = query_params.filter(|p| !p.is_empty()) {
        request = request.query(params);
    }
    if method != Method::GET {
        if let Some(body) = body {
            // `.json()` also sets `Content-Type: application/json`.
            request = request.json(body);
        }
    }

    log::debug!("{} {}", method, url);
    let response = request.send().await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
}

fn parse_method(method: &str) -> Result<Method, FetchError> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| FetchError::InvalidMethod(method.to_string()))
}
