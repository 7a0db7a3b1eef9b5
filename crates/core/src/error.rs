//! Error types for the Greenlight domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::question::{QuestionId, QuestionStatus};
use crate::scene::SceneId;

/// The top-level error type for all Greenlight operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Scene feed errors ---
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    // --- Agent caller errors ---
    #[error("Caller error: {0}")]
    Caller(#[from] CallerError),

    // --- Ledger errors (questions, emotions) ---
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    // --- Entity registry errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors produced by a scene feed. Scene ordering is a correctness
/// guarantee for the whole run, so an ordering violation is fatal.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("Scene feed out of order: expected position {expected}, got {got}")]
    OutOfOrder { expected: u32, got: u32 },

    #[error("Scene feed source unreadable: {0}")]
    Unreadable(String),
}

/// Errors from the external agent caller. All variants are recoverable
/// at the pipeline level: transient failures are retried, malformed
/// output is re-requested once with a corrective prompt.
#[derive(Debug, Clone, Error)]
pub enum CallerError {
    #[error("Agent call timed out after {elapsed_secs}s")]
    Timeout { elapsed_secs: u64 },

    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response text did not parse into the structured shape.
    /// The raw text is retained so a skipped update can be audited.
    #[error("Malformed agent response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("Caller not configured: {0}")]
    NotConfigured(String),
}

impl CallerError {
    /// Whether a retry with backoff is worthwhile (transient failures only —
    /// malformed output gets a corrective re-request instead).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport(_))
    }
}

/// Errors from the question ledger and emotional ledger. These signal a
/// logic error in the caller and are surfaced, never silently merged.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Duplicate emotional append for agent '{agent_id}' at scene {scene}")]
    DuplicateAppend { agent_id: String, scene: SceneId },

    #[error(
        "Revision order violation: target scene {target} is not before triggering scene {trigger}"
    )]
    RevisionOrder { target: SceneId, trigger: SceneId },

    #[error("Question {id} is in terminal status {status:?} and cannot transition")]
    TerminalStatus { id: QuestionId, status: QuestionStatus },

    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),
}

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_error_displays_positions() {
        let err = Error::Feed(FeedError::OutOfOrder {
            expected: 4,
            got: 6,
        });
        assert!(err.to_string().contains("expected position 4"));
        assert!(err.to_string().contains("got 6"));
    }

    #[test]
    fn caller_error_transience() {
        let timeout = CallerError::Timeout { elapsed_secs: 30 };
        let malformed = CallerError::MalformedResponse {
            reason: "missing field `reaction`".into(),
            raw: "not json".into(),
        };
        assert!(timeout.is_transient());
        assert!(!malformed.is_transient());
    }

    #[test]
    fn ledger_error_displays_context() {
        let err = Error::Ledger(LedgerError::DuplicateAppend {
            agent_id: "indie_critic".into(),
            scene: SceneId(7),
        });
        assert!(err.to_string().contains("indie_critic"));
        assert!(err.to_string().contains("scene 7"));
    }
}
