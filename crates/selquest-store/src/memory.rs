//! In-memory store for tests and embedding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use selquest_core::error::StoreError;
use selquest_core::model::{
    AssessmentQuestion, AssessmentResult, AssessmentStatus, AssessmentType, ChildProgress,
    DimensionScores,
};
use selquest_core::traits::{AssessmentStore, ProgressStore};

/// Builds the result stored by an upsert, keeping the id of `existing`.
pub(crate) fn upserted_result(
    existing: Option<AssessmentResult>,
    child_id: &str,
    assessment_type: AssessmentType,
    scores: &DimensionScores,
    completion_date: DateTime<Utc>,
) -> AssessmentResult {
    AssessmentResult {
        id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
        child_id: child_id.to_string(),
        assessment_type,
        status: AssessmentStatus::Completed,
        completion_date: Some(completion_date),
        scores: scores.clone(),
    }
}

/// A thread-safe in-memory implementation of both store traits.
#[derive(Default)]
pub struct MemoryStore {
    progress: Mutex<HashMap<String, ChildProgress>>,
    results: Mutex<HashMap<(String, AssessmentType), AssessmentResult>>,
    questions: Vec<AssessmentQuestion>,
    /// Number of successful progress writes.
    writes: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store serving the given question bank.
    pub fn with_questions(questions: Vec<AssessmentQuestion>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    /// Number of successful progress writes so far.
    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn result_count(&self) -> usize {
        self.results.lock().unwrap().len()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn load_progress(&self, child_id: &str) -> Result<Option<ChildProgress>, StoreError> {
        Ok(self.progress.lock().unwrap().get(child_id).cloned())
    }

    async fn save_progress(
        &self,
        child_id: &str,
        progress: &ChildProgress,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut map = self.progress.lock().unwrap();
        let found = map.get(child_id).map(|p| p.version).unwrap_or(0);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found,
            });
        }

        let mut stored = progress.clone();
        stored.version = found + 1;
        map.insert(child_id.to_string(), stored);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(found + 1)
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn load_questions(&self) -> Result<Vec<AssessmentQuestion>, StoreError> {
        Ok(self.questions.clone())
    }

    async fn upsert_result(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
        scores: &DimensionScores,
        completion_date: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let mut results = self.results.lock().unwrap();
        let key = (child_id.to_string(), assessment_type);
        let result = upserted_result(
            results.remove(&key),
            child_id,
            assessment_type,
            scores,
            completion_date,
        );
        let id = result.id;
        results.insert(key, result);
        Ok(id)
    }

    async fn load_result(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
    ) -> Result<Option<AssessmentResult>, StoreError> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(&(child_id.to_string(), assessment_type))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selquest_core::model::Dimension;

    #[tokio::test]
    async fn compare_and_swap() {
        let store = MemoryStore::new();
        let progress = ChildProgress {
            xp_points: 10,
            ..Default::default()
        };

        assert_eq!(store.save_progress("kid", &progress, 0).await.unwrap(), 1);
        let err = store.save_progress("kid", &progress, 0).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.save_progress("kid", &progress, 1).await.unwrap(), 2);

        let loaded = store.load_progress("kid").await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn upsert_keeps_id_and_replaces_scores() {
        let store = MemoryStore::new();
        let first: DimensionScores = [(Dimension::SelfAwareness, 40)].into_iter().collect();
        let second: DimensionScores = [(Dimension::SelfManagement, 80)].into_iter().collect();

        let id = store
            .upsert_result("kid", AssessmentType::Pre, &first, Utc::now())
            .await
            .unwrap();
        let again = store
            .upsert_result("kid", AssessmentType::Pre, &second, Utc::now())
            .await
            .unwrap();
        assert_eq!(id, again);
        assert_eq!(store.result_count(), 1);

        let loaded = store
            .load_result("kid", AssessmentType::Pre)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.scores, second);
        assert!(loaded.is_completed());
        assert!(store
            .load_result("kid", AssessmentType::Post)
            .await
            .unwrap()
            .is_none());
    }
}
