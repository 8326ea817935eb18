//! Client error types
//!
//! Every failure carries an [`ErrorKind`] so callers can branch on the class of
//! failure without inspecting messages.

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ApiErrorEnvelope;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Authentication,
    Conflict,
    NotFound,
    Api,
    Mapping,
    Cancelled,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Api => "api",
            ErrorKind::Mapping => "mapping",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Config => "config",
        };
        f.write_str(s)
    }
}

/// Error returned by the directory client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or connection failure, including request timeouts.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Login did not return the expected success marker.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The object already exists on the remote system.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The object does not exist on the remote system.
    #[error("not found: {0}")]
    NotFound(String),

    /// Non-success status from the API.
    #[error("{}", format_api_error(*status, envelope.as_ref(), body))]
    Api {
        status: StatusCode,
        envelope: Option<ApiErrorEnvelope>,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response payload: {0}")]
    Mapping(String),

    /// The caller cancelled the operation before the response arrived.
    #[error("operation cancelled")]
    Cancelled,

    /// Client configuration is incomplete or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Authentication(_) => ErrorKind::Authentication,
            ClientError::Conflict(_) => ErrorKind::Conflict,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Api { .. } => ErrorKind::Api,
            ClientError::Mapping(_) => ErrorKind::Mapping,
            ClientError::Cancelled => ErrorKind::Cancelled,
            ClientError::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status attached to this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Build an [`ClientError::Api`] from a status and raw body, parsing the
    /// structured error envelope when the body contains one.
    #[must_use]
    pub fn from_response(status: StatusCode, body: String) -> Self {
        let envelope = serde_json::from_str::<ApiErrorEnvelope>(&body).ok();
        ClientError::Api {
            status,
            envelope,
            body,
        }
    }
}

fn format_api_error(status: StatusCode, envelope: Option<&ApiErrorEnvelope>, body: &str) -> String {
    match envelope {
        Some(env) if env.error.description.is_empty() => {
            format!("API returned {status}: {}", env.error.message)
        }
        Some(env) => format!(
            "API returned {status}: {}: {}",
            env.error.message, env.error.description
        ),
        None if body.is_empty() => format!("API returned {status}"),
        None => format!("API returned {status}: {body}"),
    }
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
