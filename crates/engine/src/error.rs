//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a project or a draft breaks an invariant.
//! - [`LimitExceeded`] thrown when the collection is already full.
//! - [`Index`] thrown when an operation addresses a missing position.
//! - [`NoActiveEdit`] thrown when the edit session is idle.
//!
//! Failures of the persistence layer are reported separately through
//! [`PersistenceError`], because they never roll back the in-memory store.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`LimitExceeded`]: EngineError::LimitExceeded
//!  [`Index`]: EngineError::Index
//!  [`NoActiveEdit`]: EngineError::NoActiveEdit
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid project: {0}")]
    Validation(String),
    #[error("Project limit reached ({0} projects max)")]
    LimitExceeded(usize),
    #[error("No project at index {index} (collection has {len})")]
    Index { index: usize, len: usize },
    #[error("No edit in progress")]
    NoActiveEdit,
}

/// Errors raised by a [`SyncClient`](crate::SyncClient) while saving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("failed to encode projects: {0}")]
    Encode(String),
}

impl PersistenceError {
    /// Whether retrying the same save could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server(_))
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_server_failures_are_transient() {
        assert!(PersistenceError::Transport("reset".to_string()).is_transient());
        assert!(PersistenceError::Server("boom".to_string()).is_transient());
        assert!(!PersistenceError::Rejected("bad".to_string()).is_transient());
        assert!(!PersistenceError::Unauthorized.is_transient());
        assert!(!PersistenceError::Encode("nan".to_string()).is_transient());
    }

    #[test]
    fn limit_message_is_distinct() {
        let message = EngineError::LimitExceeded(50).to_string();
        assert!(message.contains("50"));
        assert_ne!(message, EngineError::Validation("x".to_string()).to_string());
    }
}
