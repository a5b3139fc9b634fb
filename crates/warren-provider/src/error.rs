//! Transport error types
//!
//! Any error rooted in an HTTP response renders with a `[NNN] ` prefix
//! carrying the status code. The classifier reads the typed status, and
//! downstream consumers that only see the text can still parse the prefix.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Structured error body returned by the platform
    #[error("[{status:03}] {}", describe(.message, .errors, .correlation_id))]
    Response {
        status: u16,
        message: String,
        errors: BTreeMap<String, String>,
        correlation_id: Option<String>,
    },

    #[error("[{status:03}] empty error response{}", suffix(.correlation_id))]
    EmptyErrorBody {
        status: u16,
        correlation_id: Option<String>,
    },

    #[error("[{status:03}] failed to parse error response, body: {body}{}", suffix(.correlation_id))]
    UnparseableErrorBody {
        status: u16,
        body: String,
        correlation_id: Option<String>,
    },

    #[error(
        "[{status:03}] failed to parse meaningful data from error response, body: {body}{}",
        suffix(.correlation_id)
    )]
    MeaninglessErrorBody {
        status: u16,
        body: String,
        correlation_id: Option<String>,
    },

    #[error("failed to parse response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid request URL: {0}")]
    Url(String),

    #[error("failed to call HTTP request: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP status, for errors rooted in a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response { status, .. }
            | ApiError::EmptyErrorBody { status, .. }
            | ApiError::UnparseableErrorBody { status, .. }
            | ApiError::MeaninglessErrorBody { status, .. } => Some(*status),
            ApiError::Decode { .. }
            | ApiError::Encode(_)
            | ApiError::Url(_)
            | ApiError::Transport(_) => None,
        }
    }

    /// Whether the response body failed to match the expected shape
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ApiError::EmptyErrorBody { .. }
                | ApiError::UnparseableErrorBody { .. }
                | ApiError::MeaninglessErrorBody { .. }
                | ApiError::Decode { .. }
        )
    }
}

fn describe(
    message: &str,
    errors: &BTreeMap<String, String>,
    correlation_id: &Option<String>,
) -> String {
    let mut parts = Vec::new();
    if !message.is_empty() {
        parts.push(message.to_string());
    }
    if !errors.is_empty() {
        let fields: Vec<String> = errors.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        parts.push(fields.join(", "));
    }
    format!("{}{}", parts.join("; "), suffix(correlation_id))
}

fn suffix(correlation_id: &Option<String>) -> String {
    match correlation_id {
        Some(id) if !id.is_empty() => format!(" (correlation id {})", id),
        _ => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
