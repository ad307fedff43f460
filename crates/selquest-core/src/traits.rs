//! Collaborator trait definitions.
//!
//! The engine performs no I/O of its own. Persistence, feature flags, and
//! free-text analysis are supplied by implementations of these async traits,
//! such as the ones in the `selquest-store` crate.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{
    AssessmentQuestion, AssessmentResult, AssessmentType, ChildProgress, Dimension,
    DimensionScores,
};

// ---------------------------------------------------------------------------
// Progress persistence
// ---------------------------------------------------------------------------

/// Storage for per-child gamification progress.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load a child's progress. `None` if the child has no record yet.
    async fn load_progress(&self, child_id: &str) -> Result<Option<ChildProgress>, StoreError>;

    /// Conditionally write a child's progress.
    ///
    /// The write succeeds only if the stored version equals
    /// `expected_version` (0 for a record that does not exist yet).
    /// On success the store bumps the version and returns the new value;
    /// otherwise it returns [`StoreError::VersionConflict`] and leaves the
    /// record untouched.
    async fn save_progress(
        &self,
        child_id: &str,
        progress: &ChildProgress,
        expected_version: u64,
    ) -> Result<u64, StoreError>;
}

// ---------------------------------------------------------------------------
// Assessment persistence
// ---------------------------------------------------------------------------

/// Storage for assessment questions and results.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// The question bank, ordered by display order.
    async fn load_questions(&self) -> Result<Vec<AssessmentQuestion>, StoreError>;

    /// Insert or replace the completed result for `(child_id, assessment_type)`.
    ///
    /// Returns the result id, which stays stable across re-submissions.
    async fn upsert_result(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
        scores: &DimensionScores,
        completion_date: DateTime<Utc>,
    ) -> Result<Uuid, StoreError>;

    async fn load_result(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
    ) -> Result<Option<AssessmentResult>, StoreError>;
}

// ---------------------------------------------------------------------------
// Feature flags and text analysis
// ---------------------------------------------------------------------------

/// Per-child feature switches.
#[async_trait]
pub trait FeatureFlags: Send + Sync {
    /// Whether the pre/post comparison view is enabled for a child.
    async fn comparison_enabled(&self, child_id: &str) -> bool;
}

/// External free-text analyzer returning dimension scores in `0.0..=1.0`.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, text: &str) -> anyhow::Result<BTreeMap<Dimension, f64>>;
}

/// Clamps analyzer output into `0.0..=1.0`, dropping non-finite values.
pub fn sanitize_scores(scores: BTreeMap<Dimension, f64>) -> BTreeMap<Dimension, f64> {
    scores
        .into_iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| (d, v.clamp(0.0, 1.0)))
        .collect()
}
