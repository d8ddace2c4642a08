//! Error types for fetching and normalizing the risk report.

use thiserror::Error;

/// Why a single fetch attempt did not yield a payload. Never surfaced on its
/// own; attempts are logged and retried.
#[derive(Error, Debug)]
pub enum AttemptError {
    /// Connection refused, DNS failure, reset, transport timeout.
    #[error("Request error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP error: {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// A 2xx response whose body was not JSON.
    #[error("Failed to decode response body: {0}")]
    Body(String),
}

/// Every attempt of a fetch cycle failed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no response after {attempts} attempt(s): {last_error}")]
pub struct FetchFailure {
    pub attempts: u32,
    pub last_error: String,
}

/// The payload arrived but does not satisfy the report contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// `vitals` is missing or null. Carries the server's own `error` message
    /// when it sent one instead of data.
    #[error("missing required field `vitals`{}", server_message(.server_error))]
    MissingVitals { server_error: Option<String> },

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

fn server_message(server_error: &Option<String>) -> String {
    server_error
        .as_ref()
        .map(|e| format!(" (server reported: {e})"))
        .unwrap_or_default()
}

/// Terminal outcome of a failed refresh cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Can't reach the risk service: {0}")]
    Unreachable(#[from] FetchFailure),

    #[error("Bad response from the risk service: {0}")]
    BadResponse(#[from] SchemaError),
}

impl ReportError {
    /// Short headline for the failure panel.
    pub fn headline(&self) -> &'static str {
        match self {
            ReportError::Unreachable(_) => "Can't reach service",
            ReportError::BadResponse(_) => "Bad response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_vitals_message_includes_server_error() {
        let err = SchemaError::MissingVitals {
            server_error: Some("risk.py not found".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "missing required field `vitals` (server reported: risk.py not found)"
        );

        let err = SchemaError::MissingVitals { server_error: None };
        assert_eq!(err.to_string(), "missing required field `vitals`");
    }

    #[test]
    fn test_report_error_kinds_are_distinguishable() {
        let unreachable = ReportError::from(FetchFailure {
            attempts: 5,
            last_error: "connection refused".to_string(),
        });
        let bad = ReportError::from(SchemaError::NotAnObject);

        assert_eq!(unreachable.headline(), "Can't reach service");
        assert_eq!(bad.headline(), "Bad response");
        assert_eq!(
            unreachable.to_string(),
            "Can't reach the risk service: no response after 5 attempt(s): connection refused"
        );
    }
}
