//! Job Manager: accepts project-index requests, enforces at most one
//! active job per project, and runs indexing as a background task. The
//! registry is an in-memory map behind a mutex with a lazy TTL sweep on
//! every `submit`/`list_active_jobs` call rather than a dedicated timer
//! thread, the way the repository's own workspace registry expires
//! reference workspaces opportunistically instead of on a schedule.

use crate::error::{CoreError, Result};
use crate::indexer::Indexer;
use crate::parser_pool::CancellationToken;
use crate::symbol::{now_ts, IndexingJob, IndexingStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

struct TrackedJob {
    job: IndexingJob,
    cancel: CancellationToken,
}

pub struct JobManager {
    indexer: Indexer,
    jobs: Arc<Mutex<HashMap<String, TrackedJob>>>,
    job_ttl_seconds: u64,
}

impl JobManager {
    pub fn new(indexer: Indexer, job_ttl_seconds: u64) -> Self {
        Self {
            indexer,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            job_ttl_seconds,
        }
    }

    /// Submits a project for indexing. Returns the existing job if one is
    /// already pending or in progress for the same derived `project_id`.
    pub async fn submit(&self, project_path: &PathBuf, project_name: Option<&str>) -> Result<IndexingJob> {
        self.sweep_expired();

        let canonical = project_path.canonicalize().map_err(CoreError::Io)?;
        let project_id = crate::project_id::derive_project_id(&canonical)?;

        let mut job = IndexingJob::new(&project_id, canonical.to_string_lossy().to_string());
        let cancel = CancellationToken::new();
        let job_id = job.id.clone();
        job.status = IndexingStatus::Pending;

        {
            let mut jobs = self.jobs.lock();
            if let Some(existing) = jobs.values().find(|t| t.job.project_id == project_id && !t.job.status.is_terminal()) {
                return Ok(existing.job.clone());
            }
            jobs.insert(
                job_id.clone(),
                TrackedJob {
                    job: job.clone(),
                    cancel: cancel.clone(),
                },
            );
        }

        let indexer = self.indexer.clone();
        let jobs = self.jobs.clone();
        let project_name = project_name.map(|s| s.to_string());
        let path = canonical.clone();
        let job_id_for_task = job_id.clone();

        tokio::spawn(async move {
            {
                let mut guard = jobs.lock();
                if let Some(tracked) = guard.get_mut(&job_id_for_task) {
                    tracked.job.status = IndexingStatus::InProgress;
                }
            }
            info!(job_id = %job_id_for_task, project_id = %project_id, "indexing job started");

            let result = indexer.index_project(&path, project_name.as_deref(), &cancel).await;

            let mut guard = jobs.lock();
            if let Some(tracked) = guard.get_mut(&job_id_for_task) {
                if cancel.is_cancelled() {
                    tracked.job.status = IndexingStatus::Cancelled;
                } else {
                    match result {
                        Ok(outcome) => {
                            tracked.job.status = IndexingStatus::Completed;
                            tracked.job.progress = 1.0;
                            tracked.job.files_total = outcome.files_total;
                            tracked.job.files_indexed = outcome.files_indexed;
                            tracked.job.symbols_found = outcome.symbols_found;
                            tracked.job.file_errors = outcome.file_errors;
                        }
                        Err(e) => {
                            error!(job_id = %job_id_for_task, error = %e, "indexing job failed");
                            tracked.job.status = IndexingStatus::Failed;
                            tracked.job.error = Some(e.to_string());
                        }
                    }
                }
                tracked.job.completed_at = Some(now_ts());
            }
        });

        Ok(job)
    }

    pub fn get_job_status(&self, job_id: &str) -> Result<IndexingJob> {
        self.sweep_expired();
        self.jobs
            .lock()
            .get(job_id)
            .map(|t| t.job.clone())
            .ok_or_else(|| CoreError::JobNotFound(job_id.to_string()))
    }

    pub fn list_active_jobs(&self) -> Vec<IndexingJob> {
        self.sweep_expired();
        self.jobs
            .lock()
            .values()
            .filter(|t| !t.job.status.is_terminal())
            .map(|t| t.job.clone())
            .collect()
    }

    /// Idempotent on terminal jobs: cancelling an already-terminal or
    /// unknown job is a no-op rather than an error.
    pub fn cancel(&self, job_id: &str) {
        let jobs = self.jobs.lock();
        if let Some(tracked) = jobs.get(job_id) {
            if !tracked.job.status.is_terminal() {
                tracked.cancel.cancel();
            }
        }
    }

    fn sweep_expired(&self) {
        let now = now_ts();
        let ttl = self.job_ttl_seconds as i64;
        let mut jobs = self.jobs.lock();
        jobs.retain(|_, tracked| {
            !tracked.job.status.is_terminal() || tracked.job.completed_at.map(|t| now - t < ttl).unwrap_or(true)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::embedder::{Embedder, HashEmbedder};
    use crate::storage::sqlite::SqliteStorage;
    use crate::storage::Storage;
    use std::fs;
    use tempfile::tempdir;
    use tokio::time::{sleep, Duration};

    fn manager(ttl: u64) -> JobManager {
        let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_in_memory(2_000).unwrap());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
        let indexer = Indexer::new(storage, embedder, Config::default());
        JobManager::new(indexer, ttl)
    }

    #[tokio::test]
    async fn resubmitting_same_project_returns_same_job() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "pub fn a() {}").unwrap();
        let manager = manager(600);

        let first = manager.submit(&dir.path().to_path_buf(), None).await.unwrap();
        let second = manager.submit(&dir.path().to_path_buf(), None).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn job_completes_and_is_queryable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "pub fn a() {}").unwrap();
        let manager = manager(600);

        let job = manager.submit(&dir.path().to_path_buf(), None).await.unwrap();
        for _ in 0..50 {
            let status = manager.get_job_status(&job.id).unwrap();
            if status.status.is_terminal() {
                assert_eq!(status.status, IndexingStatus::Completed);
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
        panic!("job did not complete in time");
    }

    #[tokio::test]
    async fn cancel_on_unknown_job_is_a_no_op() {
        let manager = manager(600);
        manager.cancel("does-not-exist");
    }
}
</content>
