//! JSON file store.
//!
//! Layout under the data directory:
//!
//! ```text
//! progress/<child>.json
//! assessments/<child>/pre.json
//! assessments/<child>/post.json
//! ```
//!
//! Files are replaced atomically (temp file + rename). Every
//! read-compare-write holds a lease file next to the record
//! (`<record>.lock`, created with `create_new`), so the version check is a
//! real compare-and-swap across processes sharing one data directory, not
//! just across tasks in one process.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use selquest_core::error::StoreError;
use selquest_core::model::{
    AssessmentQuestion, AssessmentResult, AssessmentType, ChildProgress, DimensionScores,
};
use selquest_core::traits::{AssessmentStore, ProgressStore};

use crate::memory::upserted_result;

/// How long a writer waits for another writer's lease.
const LEASE_TIMEOUT: Duration = Duration::from_secs(5);
/// A lease older than this was left behind by a crashed writer.
const STALE_LEASE: Duration = Duration::from_secs(30);
const LEASE_POLL: Duration = Duration::from_millis(10);

pub struct JsonFileStore {
    root: PathBuf,
    questions: Vec<AssessmentQuestion>,
    write_lock: Mutex<()>,
    lease_timeout: Duration,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(
        root: impl Into<PathBuf>,
        questions: Vec<AssessmentQuestion>,
    ) -> Result<Self, StoreError> {
        let root = root.into();
        for sub in ["progress", "assessments"] {
            let dir = root.join(sub);
            std::fs::create_dir_all(&dir).map_err(|e| {
                StoreError::Unavailable(format!("failed to create {}: {e}", dir.display()))
            })?;
        }
        tracing::debug!(root = %root.display(), "opened json store");
        Ok(Self {
            root,
            questions,
            write_lock: Mutex::new(()),
            lease_timeout: LEASE_TIMEOUT,
        })
    }

    /// Override how long a write waits for a lease held elsewhere.
    pub fn with_lease_timeout(mut self, timeout: Duration) -> Self {
        self.lease_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn progress_path(&self, child_id: &str) -> PathBuf {
        self.root
            .join("progress")
            .join(format!("{}.json", file_stem(child_id)))
    }

    fn result_path(&self, child_id: &str, assessment_type: AssessmentType) -> PathBuf {
        let name = match assessment_type {
            AssessmentType::Pre => "pre.json",
            AssessmentType::Post => "post.json",
        };
        self.root
            .join("assessments")
            .join(file_stem(child_id))
            .join(name)
    }
}

/// Encodes a child id as a safe file name: ASCII alphanumerics, `-`, and
/// `_` pass through, every other byte becomes `%XX`.
fn file_stem(child_id: &str) -> String {
    let mut out = String::with_capacity(child_id.len());
    for byte in child_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Exclusive claim on one record, held from the version read until the
/// replacement file is in place. Removed on drop.
struct Lease {
    path: PathBuf,
}

impl Lease {
    async fn acquire(record: &Path, timeout: Duration) -> Result<Self, StoreError> {
        let path = record.with_extension("lock");
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                StoreError::Unavailable(format!("failed to create {}: {e}", dir.display()))
            })?;
        }

        let started = Instant::now();
        loop {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if lease_is_stale(&path) {
                        tracing::warn!(lease = %path.display(), "breaking stale lease");
                        let _ = std::fs::remove_file(&path);
                        continue;
                    }
                    if started.elapsed() >= timeout {
                        return Err(StoreError::Unavailable(format!(
                            "timed out waiting for lease {}",
                            path.display()
                        )));
                    }
                    tokio::time::sleep(LEASE_POLL).await;
                }
                Err(e) => {
                    return Err(StoreError::Unavailable(format!(
                        "failed to create lease {}: {e}",
                        path.display()
                    )))
                }
            }
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lease = %self.path.display(), "failed to release lease: {e}");
        }
    }
}

fn lease_is_stale(path: &Path) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_LEASE)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Unavailable(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let unavailable = |e: std::io::Error| {
        StoreError::Unavailable(format!("failed to write {}: {e}", path.display()))
    };

    let dir = path
        .parent()
        .ok_or_else(|| StoreError::Unavailable(format!("no parent for {}", path.display())))?;
    std::fs::create_dir_all(dir).map_err(unavailable)?;

    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| StoreError::Corrupt(format!("failed to serialize: {e}")))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(unavailable)?;
    tmp.write_all(&json).map_err(unavailable)?;
    tmp.persist(path).map_err(|e| unavailable(e.error))?;
    Ok(())
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    async fn load_progress(&self, child_id: &str) -> Result<Option<ChildProgress>, StoreError> {
        read_json(&self.progress_path(child_id))
    }

    async fn save_progress(
        &self,
        child_id: &str,
        progress: &ChildProgress,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.progress_path(child_id);
        let _lease = Lease::acquire(&path, self.lease_timeout).await?;

        let found = read_json::<ChildProgress>(&path)?
            .map(|p| p.version)
            .unwrap_or(0);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found,
            });
        }

        let mut stored = progress.clone();
        stored.version = found + 1;
        write_json(&path, &stored)?;
        Ok(stored.version)
    }
}

#[async_trait]
impl AssessmentStore for JsonFileStore {
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
        let _guard = self.write_lock.lock().await;
        let path = self.result_path(child_id, assessment_type);
        let _lease = Lease::acquire(&path, self.lease_timeout).await?;

        let existing = read_json::<AssessmentResult>(&path)?;
        let result = upserted_result(existing, child_id, assessment_type, scores, completion_date);
        write_json(&path, &result)?;
        Ok(result.id)
    }

    async fn load_result(
        &self,
        child_id: &str,
        assessment_type: AssessmentType,
    ) -> Result<Option<AssessmentResult>, StoreError> {
        read_json(&self.result_path(child_id, assessment_type))
    }
}
