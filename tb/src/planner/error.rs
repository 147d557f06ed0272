//! Journey-planner error types

use std::time::Duration;
use thiserror::Error;

/// Errors from location search and trip search
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read fixture {path}: {source}")]
    Fixture {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PlannerError {
    /// Map a reqwest failure, separating deadline expiry from other network errors
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            PlannerError::Timeout(timeout)
        } else {
            PlannerError::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status_and_body() {
        let err = PlannerError::Status {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error 503: maintenance");
        assert_eq!(
            PlannerError::Timeout(Duration::from_secs(10)).to_string(),
            "Timeout after 10s"
        );
    }
}
