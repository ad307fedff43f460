//! Engine error types.
//!
//! Validation failures are raised before any state changes. Store failures
//! are classified so callers can tell a retryable outage from a conflict
//! that already resolved itself.

use thiserror::Error;

/// Input rejected before any state mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The child identifier was empty or blank.
    #[error("child id is missing")]
    MissingChildId,

    /// An assessment was submitted without answers.
    #[error("answer set is empty")]
    EmptyAnswers,

    /// Some questions were left unanswered.
    #[error("unanswered questions: {}", missing.join(", "))]
    IncompleteAnswers { missing: Vec<String> },

    /// A Likert value outside 1..=5.
    #[error("likert value {0} is outside 1..=5")]
    LikertOutOfRange(u8),

    /// A dimension name that is not one of the five SEL dimensions.
    #[error("unknown SEL dimension: {0}")]
    UnknownDimension(String),
}

/// Errors reported by persistence collaborators.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A conditional write found a different version than expected.
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}

/// Errors surfaced by the [`ProgressEngine`](crate::engine::ProgressEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Concurrent writers kept winning the conditional update. The caller's
    /// event was already applied by another writer or is safe to drop.
    #[error("concurrent update for child {child_id}")]
    Conflict { child_id: String },

    #[error("persistence failure: {0}")]
    Persistence(StoreError),
}

impl EngineError {
    /// Returns `true` if retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Persistence(e) if !e.is_conflict())
    }

    /// Returns `true` if the caller should treat this as a successful no-op.
    pub fn is_noop(&self) -> bool {
        matches!(self, EngineError::Conflict { .. })
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Persistence(err)
    }
}
