//! Error types for mapping, lifecycle and lookup operations.

use cleura_client::{ClientError, ErrorKind};
use thiserror::Error;

use crate::reconciler::Action;

/// A remote payload could not be projected onto the canonical model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The payload is not shaped like the expected record.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The same project appears twice in one account's bindings.
    #[error("project '{0}' is bound more than once")]
    DuplicateProject(String),
}

/// Classification of a lifecycle failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Failure reported by, or on the way to, the remote system.
    Remote(ErrorKind),
    /// The lifecycle call was made in a state it does not accept.
    Precondition,
}

/// Error returned by the lifecycle controller.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("precondition failed: {0}")]
    Precondition(String),

    /// An update action failed after `applied` had already taken effect.
    /// Nothing is rolled back.
    #[error("update aborted at {failed} after {} applied action(s): {source}", applied.len())]
    PartialUpdate {
        applied: Vec<Action>,
        failed: Action,
        #[source]
        source: ClientError,
    },
}

impl LifecycleError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            LifecycleError::Client(e) => FailureKind::Remote(e.kind()),
            LifecycleError::PartialUpdate { source, .. } => FailureKind::Remote(source.kind()),
            LifecycleError::Mapping(_) => FailureKind::Remote(ErrorKind::Mapping),
            LifecycleError::Precondition(_) => FailureKind::Precondition,
        }
    }

    /// Host-facing diagnostic for this error.
    #[must_use]
    pub fn diagnostic(&self, summary: impl Into<String>) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: self.to_string(),
            kind: Some(self.kind()),
        }
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Human-readable message plus machine context, handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    pub kind: Option<FailureKind>,
}

impl Diagnostic {
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            kind: None,
        }
    }
}

/// Error returned by data-source lookups.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("a non-empty id is required")]
    MissingId,

    #[error("a non-empty name is required")]
    MissingName,

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
