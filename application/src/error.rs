//! Pipeline error type
//!
//! Every stage returns [`PipelineError`]. [`PipelineError::kind`] places an
//! error in one of six classes; only `Transient` errors are worth
//! redelivering a job for.

use crate::ports::embedding::EmbeddingError;
use crate::ports::repository::RepositoryError;
use crate::ports::review_queue::QueueError;
use crate::services::llm_client::LlmError;
use thiserror::Error;
use vetting_domain::DomainError;

/// Error classes a pipeline failure falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required dependency is not configured; fatal at startup
    Configuration,
    /// Malformed caller input
    Validation,
    /// Referenced data does not exist
    NotFound,
    /// A precondition the run relies on is broken
    Invariant,
    /// The dependency may recover on its own
    Transient,
    /// An expected write did not land
    Persistence,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Invariant => "invariant",
            ErrorKind::Transient => "transient",
            ErrorKind::Persistence => "persistence",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Invariant(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl PipelineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PipelineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        PipelineError::Invariant(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Configuration(_) => ErrorKind::Configuration,
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::NotFound { .. } => ErrorKind::NotFound,
            PipelineError::Invariant(_) => ErrorKind::Invariant,
            PipelineError::Domain(e) if e.is_validation() => ErrorKind::Validation,
            PipelineError::Domain(_) => ErrorKind::Invariant,
            PipelineError::Llm(LlmError::CircuitOpen(_)) => ErrorKind::Transient,
            PipelineError::Llm(_) => ErrorKind::Invariant,
            PipelineError::Embedding(EmbeddingError::Api { status: 401 | 403, .. }) => {
                ErrorKind::Configuration
            }
            PipelineError::Embedding(EmbeddingError::Api { status, .. })
                if (400..500).contains(status) && *status != 429 =>
            {
                ErrorKind::Invariant
            }
            PipelineError::Embedding(_) => ErrorKind::Transient,
            PipelineError::Repository(RepositoryError::InvalidQuery(_)) => ErrorKind::Validation,
            PipelineError::Repository(_) => ErrorKind::Persistence,
            PipelineError::Queue(_) => ErrorKind::Transient,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
