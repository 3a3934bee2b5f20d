//! Watcher contract: the core never reaches for `notify` directly, only
//! through the [`WatcherManager`] trait. [`NotifyWatcherManager`] is the
//! ambient reference implementation — a thin wrapper over `notify`'s
//! recommended watcher that queues changed paths and reindexes them through
//! the same per-file path the Indexer Core already exposes.

use crate::error::{CoreError, Result};
use crate::indexer::Indexer;
use crate::scanner::FileScanner;
use crate::storage::Storage;
use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct WatchStatus {
    pub project_id: String,
    pub root_path: String,
    pub active: bool,
    pub last_event_at: Option<i64>,
}

/// At most one watched project at a time: activating a new one first
/// deactivates whatever was previously active.
#[async_trait]
pub trait WatcherManager: Send + Sync {
    async fn activate_project(&self, project_id: &str, root_path: &Path) -> Result<(usize, Option<String>)>;
    async fn deactivate_project(&self, project_id: Option<&str>) -> Result<Option<String>>;
    fn get_project_watch_status(&self, project_id: &str) -> Option<WatchStatus>;
    fn get_all_watch_status(&self) -> Vec<WatchStatus>;
    fn get_active_project(&self) -> Option<String>;
}

struct ActiveWatch {
    project_id: String,
    root_path: PathBuf,
    _watcher: RecommendedWatcher,
}

pub struct NotifyWatcherManager {
    indexer: Indexer,
    storage: Arc<dyn Storage>,
    scanner: Arc<FileScanner>,
    active: Mutex<Option<ActiveWatch>>,
    statuses: Mutex<HashMap<String, WatchStatus>>,
}

impl NotifyWatcherManager {
    pub fn new(indexer: Indexer, storage: Arc<dyn Storage>) -> Self {
        Self {
            indexer,
            storage,
            scanner: Arc::new(FileScanner::new()),
            active: Mutex::new(None),
            statuses: Mutex::new(HashMap::new()),
        }
    }

    /// Rescans `root_path` and counts files whose content hash no longer
    /// matches what storage has on record; this is the "how stale is the
    /// index right now" figure `activate_project` reports back.
    async fn count_outdated(&self, project_id: &str, root_path: &Path) -> Result<usize> {
        let scanned = self.scanner.scan(root_path, &crate::config::Config::default())?;
        let existing = self.storage.list_code_files(project_id).await?;
        let existing_map: HashMap<&str, &str> = existing.iter().map(|f| (f.file_path.as_str(), f.file_hash.as_str())).collect();
        let outdated = scanned
            .iter()
            .filter(|f| existing_map.get(f.relative_path.as_str()).map(|h| *h != f.content_hash).unwrap_or(true))
            .count();
        Ok(outdated)
    }

    fn spawn_watch(&self, project_id: String, root_path: PathBuf) -> Result<RecommendedWatcher> {
        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            if tx.send(res).is_err() {
                debug!("watch event dropped, receiver gone");
            }
        })
        .map_err(|e| CoreError::Storage(e.to_string()))?;

        watcher
            .watch(&root_path, RecursiveMode::Recursive)
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        let indexer = self.indexer.clone();
        let watched_root = root_path.clone();
        let watched_project = project_id.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let event = match event {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "watcher error");
                        continue;
                    }
                };
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
                    continue;
                }
                for path in event.paths {
                    let Ok(relative) = path.strip_prefix(&watched_root) else {
                        continue;
                    };
                    let relative_path = relative.to_string_lossy().replace('\\', "/");
                    if relative_path.is_empty() {
                        continue;
                    }
                    if let Err(e) = indexer.reindex_file(&watched_project, &relative_path).await {
                        warn!(project_id = %watched_project, file = %relative_path, error = %e, "incremental reindex failed");
                    }
                }
            }
            info!(project_id = %watched_project, "watch channel closed");
        });

        Ok(watcher)
    }
}

#[async_trait]
impl WatcherManager for NotifyWatcherManager {
    async fn activate_project(&self, project_id: &str, root_path: &Path) -> Result<(usize, Option<String>)> {
        let previous = self.deactivate_project(None).await?;

        let outdated_count = self.count_outdated(project_id, root_path).await?;
        let watcher = self.spawn_watch(project_id.to_string(), root_path.to_path_buf())?;

        *self.active.lock() = Some(ActiveWatch {
            project_id: project_id.to_string(),
            root_path: root_path.to_path_buf(),
            _watcher: watcher,
        });

        self.statuses.lock().insert(
            project_id.to_string(),
            WatchStatus {
                project_id: project_id.to_string(),
                root_path: root_path.to_string_lossy().to_string(),
                active: true,
                last_event_at: None,
            },
        );

        Ok((outdated_count, previous))
    }

    async fn deactivate_project(&self, project_id: Option<&str>) -> Result<Option<String>> {
        let mut active = self.active.lock();
        let Some(current) = active.as_ref() else {
            return Ok(None);
        };
        if let Some(target) = project_id {
            if current.project_id != target {
                return Ok(None);
            }
        }
        let deactivated = current.project_id.clone();
        if let Some(status) = self.statuses.lock().get_mut(&deactivated) {
            status.active = false;
        }
        *active = None;
        Ok(Some(deactivated))
    }

    fn get_project_watch_status(&self, project_id: &str) -> Option<WatchStatus> {
        self.statuses.lock().get(project_id).cloned()
    }

    fn get_all_watch_status(&self) -> Vec<WatchStatus> {
        self.statuses.lock().values().cloned().collect()
    }

    fn get_active_project(&self) -> Option<String> {
        self.active.lock().as_ref().map(|a| a.project_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::embedder::{Embedder, HashEmbedder};
    use crate::parser_pool::CancellationToken;
    use crate::storage::sqlite::SqliteStorage;
    use std::fs;
    use tempfile::tempdir;

    async fn manager() -> (NotifyWatcherManager, String, tempfile::TempDir) {
        let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_in_memory(2_000).unwrap());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
        let indexer = Indexer::new(storage.clone(), embedder, Config::default());

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "pub fn a() {}").unwrap();
        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

        (NotifyWatcherManager::new(indexer, storage), project_id, dir)
    }

    #[tokio::test]
    async fn activating_a_second_project_deactivates_the_first() {
        let (watcher, project_id, dir) = manager().await;
        let (_, previous) = watcher.activate_project(&project_id, dir.path()).await.unwrap();
        assert_eq!(previous, None);
        assert_eq!(watcher.get_active_project(), Some(project_id.clone()));

        let other_dir = tempdir().unwrap();
        let (_, previous) = watcher.activate_project("other-project", other_dir.path()).await.unwrap();
        assert_eq!(previous, Some(project_id));
        assert_eq!(watcher.get_active_project(), Some("other-project".to_string()));
    }

    #[tokio::test]
    async fn activate_reports_zero_outdated_files_right_after_indexing() {
        let (watcher, project_id, dir) = manager().await;
        let (outdated, _) = watcher.activate_project(&project_id, dir.path()).await.unwrap();
        assert_eq!(outdated, 0);
    }

    #[tokio::test]
    async fn deactivate_with_no_active_project_is_a_no_op() {
        let (watcher, _project_id, _dir) = manager().await;
        let result = watcher.deactivate_project(None).await.unwrap();
        assert_eq!(result, None);
    }
}
