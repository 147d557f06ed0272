//! Chat transport error types

use thiserror::Error;

/// Errors delivering messages or polling for updates
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
