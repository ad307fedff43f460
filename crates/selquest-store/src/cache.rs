//! TTL read cache over a progress store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

use selquest_core::error::StoreError;
use selquest_core::model::{
    AssessmentQuestion, AssessmentResult, AssessmentType, ChildProgress, DimensionScores,
};
use selquest_core::traits::{AssessmentStore, ProgressStore};

/// Wraps a store and serves progress reads from memory for `ttl`.
///
/// Successful writes refresh the entry; failed writes (conflicts
/// included) drop it so the next read goes to the inner store. A zero
/// TTL disables caching. Assessment calls pass straight through.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, ChildProgress)>>,
}

impl<S> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn invalidate(&self, child_id: &str) {
        self.entries.lock().unwrap().remove(child_id);
    }

    fn cached(&self, child_id: &str) -> Option<ChildProgress> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(child_id) {
            Some((at, progress)) if at.elapsed() < self.ttl => Some(progress.clone()),
            Some(_) => {
                entries.remove(child_id);
                None
            }
            None => None,
        }
    }

    fn remember(&self, child_id: &str, progress: ChildProgress) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries
            .lock()
            .unwrap()
            .insert(child_id.to_string(), (Instant::now(), progress));
    }
}

#[async_trait]
impl<S: ProgressStore> ProgressStore for CachedStore<S> {
    async fn load_progress(&self, child_id: &str) -> Result<Option<ChildProgress>, StoreError> {
        if let Some(progress) = self.cached(child_id) {
            tracing::trace!(child_id, "progress cache hit");
            return Ok(Some(progress));
        }

        let loaded = self.inner.load_progress(child_id).await?;
        if let Some(progress) = &loaded {
            self.remember(child_id, progress.clone());
        }
        Ok(loaded)
    }

    async fn save_progress(
        &self,
        child_id: &str,
        progress: &ChildProgress,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        match self
            .inner
            .save_progress(child_id, progress, expected_version)
            .await
        {
            Ok(version) => {
                let mut stored = progress.clone();
                stored.version = version;
                self.remember(child_id, stored);
                Ok(version)
            }
            Err(e) => {
                self.invalidate(child_id);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: AssessmentStore> AssessmentStore for CachedStore<S> {
    async fn load_questions(&self) -> Result<Vec<AssessmentQuestion>, StoreError> {
        self.inner.load_questions().await
    }

    async fn upsert_result(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
        scores: &DimensionScores,
        completion_date: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        self.inner
            .upsert_result(child_id, assessment_type, scores, completion_date)
            .await
    }

    async fn load_result(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
    ) -> Result<Option<AssessmentResult>, StoreError> {
        self.inner.load_result(child_id, assessment_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn progress(xp: u32) -> ChildProgress {
        ChildProgress {
            xp_points: xp,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn serves_stale_reads_until_ttl() {
        let cache = CachedStore::new(MemoryStore::new(), Duration::from_secs(30));
        assert_eq!(cache.save_progress("kid", &progress(10), 0).await.unwrap(), 1);

        // A write that bypasses the cache.
        cache
            .inner()
            .save_progress("kid", &progress(20), 1)
            .await
            .unwrap();

        let cached = cache.load_progress("kid").await.unwrap().unwrap();
        assert_eq!(cached.xp_points, 10);
        assert_eq!(cached.version, 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        let fresh = cache.load_progress("kid").await.unwrap().unwrap();
        assert_eq!(fresh.xp_points, 20);
        assert_eq!(fresh.version, 2);
    }

    #[tokio::test]
    async fn conflict_invalidates_entry() {
        let cache = CachedStore::new(MemoryStore::new(), Duration::from_secs(30));
        cache.save_progress("kid", &progress(10), 0).await.unwrap();
        cache
            .inner()
            .save_progress("kid", &progress(20), 1)
            .await
            .unwrap();

        let stale = cache.load_progress("kid").await.unwrap().unwrap();
        let err = cache
            .save_progress("kid", &progress(30), stale.version)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let reloaded = cache.load_progress("kid").await.unwrap().unwrap();
        assert_eq!(reloaded.version, 2);
        assert_eq!(
            cache.save_progress("kid", &progress(30), 2).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let cache = CachedStore::new(MemoryStore::new(), Duration::ZERO);
        cache.save_progress("kid", &progress(10), 0).await.unwrap();
        cache
            .inner()
            .save_progress("kid", &progress(20), 1)
            .await
            .unwrap();

        let loaded = cache.load_progress("kid").await.unwrap().unwrap();
        assert_eq!(loaded.xp_points, 20);
    }

    #[tokio::test]
    async fn assessments_pass_through() {
        let cache = CachedStore::new(MemoryStore::new(), Duration::from_secs(30));
        let scores: DimensionScores = DimensionScores::new();
        let id = cache
            .upsert_result("kid", AssessmentType::Pre, &scores, Utc::now())
            .await
            .unwrap();
        let loaded = cache
            .inner()
            .load_result("kid", AssessmentType::Pre)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, id);
    }
}
