use thiserror::Error;

/// Errors raised by editor-style operations on a `FormConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse form configuration JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Rule index {index} is out of bounds for a rule list of length {len}")]
    RuleIndexOutOfBounds { index: usize, len: usize },

    #[error("Field id must not be empty")]
    EmptyFieldId,
}

/// Errors that can occur while reading or writing the persisted form record.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize form record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Stored record under key '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },
}

/// Failures inside the remote fetcher. Apart from `ClientBuild`, these never
/// leave the fetcher; they are logged and collapsed into an absent result.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Unsupported HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Network response was not ok: {status} from '{url}'")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Response from '{url}' is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
