//! Indexer Core: per-project reconcile pipeline — diff by hash, parse,
//! embed, write; delete stale. An async/`tokio` core with `spawn_blocking`
//! around the CPU-bound parse+extract step, and a bounded semaphore for
//! parse concurrency.

use crate::config::Config;
use crate::embedder::Embedder;
use crate::error::{CoreError, Result};
use crate::extractors::ExtractorManager;
use crate::parser_pool::{CancellationToken, ParserPool};
use crate::project_id::derive_project_id;
use crate::scanner::{FileScanner, ScannedFile};
use crate::storage::Storage;
use crate::symbol::{now_ts, Chunk, CodeFile, CodeProject, CodeSymbol, IndexingStatus};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const EMBEDDING_INPUT_CAP: usize = 2_000;

/// What one `index_project` run did, for the Job Manager to fold into an
/// `IndexingJob`.
#[derive(Debug, Clone)]
pub struct IndexOutcome {
    pub project_id: String,
    pub files_total: u32,
    pub files_indexed: u32,
    pub symbols_found: u32,
    pub file_errors: Vec<(String, String)>,
}

#[derive(Clone)]
pub struct Indexer {
    storage: Arc<dyn Storage>,
    embedder: Arc<dyn Embedder>,
    parser_pool: Arc<ParserPool>,
    extractors: Arc<ExtractorManager>,
    scanner: Arc<FileScanner>,
    config: Config,
}

impl Indexer {
    pub fn new(storage: Arc<dyn Storage>, embedder: Arc<dyn Embedder>, config: Config) -> Self {
        Self {
            storage,
            embedder,
            parser_pool: Arc::new(ParserPool::new()),
            extractors: Arc::new(ExtractorManager::new()),
            scanner: Arc::new(FileScanner::new()),
            config,
        }
    }

    /// Indexes (or reconciles) the project rooted at `path`.
    pub async fn index_project(&self, path: &Path, name: Option<&str>, cancel: &CancellationToken) -> Result<IndexOutcome> {
        let canonical = path.canonicalize()?;
        let project_id = derive_project_id(&canonical)?;
        let root_path = canonical.to_string_lossy().to_string();

        let mut project = match self.storage.get_code_project(&project_id).await? {
            Some(existing) => existing,
            None => {
                let default_name = canonical
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| project_id.clone());
                CodeProject::new(&project_id, name.unwrap_or(&default_name), &root_path)
            }
        };

        if let Some(existing_dim) = project.embedding_dimension {
            if existing_dim != self.embedder.dimension() {
                info!(
                    project_id = %project_id,
                    old_dimension = existing_dim,
                    new_dimension = self.embedder.dimension(),
                    "embedder dimension changed, purging project and forcing a full reindex"
                );
                self.storage.delete_code_project_cascade(&project_id).await?;
                let default_name = canonical
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| project_id.clone());
                project = CodeProject::new(&project_id, name.unwrap_or(&default_name), &root_path);
            }
        }

        project.indexing_status = IndexingStatus::InProgress;
        project.updated_at = now_ts();
        self.storage.save_code_project(&project).await?;

        let scan_result = self.scanner.scan(&canonical, &self.config);
        let scanned = match scan_result {
            Ok(files) => files,
            Err(e) => {
                project.indexing_status = IndexingStatus::Failed;
                project.updated_at = now_ts();
                self.storage.save_code_project(&project).await?;
                return Err(e);
            }
        };

        let existing_files = self.storage.list_code_files(&project_id).await?;
        let existing_map: HashMap<String, CodeFile> = existing_files.into_iter().map(|f| (f.file_path.clone(), f)).collect();
        let scanned_paths: std::collections::HashSet<&str> = scanned.iter().map(|f| f.relative_path.as_str()).collect();

        let to_delete: Vec<String> = existing_map
            .keys()
            .filter(|p| !scanned_paths.contains(p.as_str()))
            .cloned()
            .collect();

        for stale in &to_delete {
            self.storage.delete_symbols_by_file(&project_id, stale).await?;
            self.storage.delete_chunks_by_file(&project_id, stale).await?;
            self.storage.delete_code_file(&project_id, stale).await?;
        }

        let to_parse: Vec<ScannedFile> = scanned
            .iter()
            .filter(|f| existing_map.get(&f.relative_path).map(|e| e.file_hash != f.content_hash).unwrap_or(true))
            .cloned()
            .collect();

        debug!(project_id = %project_id, total = scanned.len(), changed = to_parse.len(), deleted = to_delete.len(), "reconcile plan computed");

        let mut file_errors = Vec::new();
        let mut symbols_found = 0u32;
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.parse_workers.max(1)));
        let mut tasks = Vec::with_capacity(to_parse.len());

        for file in to_parse {
            if cancel.is_cancelled() {
                break;
            }
            let permit = semaphore.clone().acquire_owned().await.map_err(|e| CoreError::Storage(e.to_string()))?;
            let this = self.clone();
            let project_id = project_id.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let relative_path = file.relative_path.clone();
                let result = this.process_file(&project_id, &file).await;
                (relative_path, result)
            }));
        }

        for task in tasks {
            let (relative_path, result) = task.await.map_err(|e| CoreError::Storage(e.to_string()))?;
            match result {
                Ok(count) => symbols_found += count,
                Err(e) => {
                    warn!(project_id = %project_id, file = %relative_path, error = %e, "file indexing failed, recording per-file error");
                    file_errors.push((relative_path, e.to_string()));
                }
            }
        }

        let mut language_stats = HashMap::new();
        for f in &scanned {
            *language_stats.entry(f.language.as_str().to_string()).or_insert(0u64) += 1;
        }

        project.language_stats = language_stats;
        project.last_indexed_at = Some(now_ts());
        project.indexing_status = IndexingStatus::Completed;
        project.embedding_dimension = Some(self.embedder.dimension());
        project.updated_at = now_ts();
        self.storage.save_code_project(&project).await?;

        let files_total = scanned.len() as u32;
        let files_failed = file_errors.len() as u32;
        Ok(IndexOutcome {
            project_id,
            files_total,
            files_indexed: files_total.saturating_sub(files_failed),
            symbols_found,
            file_errors,
        })
    }

    /// Re-runs the parse/extract/embed/commit steps for one file of an
    /// already-indexed project.
    pub async fn reindex_file(&self, project_id: &str, relative_path: &str) -> Result<()> {
        let project = self
            .storage
            .get_code_project(project_id)
            .await?
            .ok_or_else(|| CoreError::ProjectNotFound(project_id.to_string()))?;

        let absolute_path = Path::new(&project.root_path).join(relative_path);
        if !absolute_path.is_file() {
            return Err(CoreError::FileNotFound(relative_path.to_string()));
        }

        let registry = crate::registry::LanguageRegistry::new();
        let language = registry
            .language_for_path(&absolute_path)
            .ok_or_else(|| CoreError::UnsupportedLanguage(relative_path.to_string()))?;

        let bytes = std::fs::read(&absolute_path)?;
        let content_hash = sha256_hex(&bytes);

        let file = ScannedFile {
            relative_path: relative_path.to_string(),
            absolute_path,
            language,
            content_hash,
        };

        self.process_file(project_id, &file).await?;
        Ok(())
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.storage.delete_code_project_cascade(project_id).await
    }

    async fn process_file(&self, project_id: &str, file: &ScannedFile) -> Result<u32> {
        let bytes = tokio::fs::read(&file.absolute_path).await?;
        let source = String::from_utf8_lossy(&bytes).into_owned();

        let parser_pool = self.parser_pool.clone();
        let extractors = self.extractors.clone();
        let config = self.config.clone();
        let project_id_owned = project_id.to_string();
        let relative_path = file.relative_path.clone();
        let language = file.language;

        let mut symbols = tokio::task::spawn_blocking(move || -> Result<Vec<CodeSymbol>> {
            let tree = parser_pool.parse(&bytes, language)?;
            Ok(extractors.extract(&tree, &source, &relative_path, &project_id_owned, language, &config))
        })
        .await
        .map_err(|e| CoreError::Parse {
            path: file.relative_path.clone(),
            message: e.to_string(),
        })??;

        if !symbols.is_empty() {
            let inputs: Vec<String> = symbols
                .iter()
                .map(|s| truncate(&format!("{} {} {}", s.name, s.symbol_type.as_str(), s.source_code.clone().unwrap_or_default()), EMBEDDING_INPUT_CAP))
                .collect();

            let mut offset = 0usize;
            for chunk in inputs.chunks(self.config.max_batch_size.max(1)) {
                match self.embedder.embed_documents(chunk).await {
                    Ok(vectors) if vectors.len() == chunk.len() => {
                        for (i, v) in vectors.into_iter().enumerate() {
                            symbols[offset + i].embedding = Some(v);
                        }
                    }
                    Ok(_) => {
                        warn!(file = %file.relative_path, "embedding batch size mismatch, leaving embeddings empty for this batch");
                    }
                    Err(e) => {
                        warn!(file = %file.relative_path, error = %e, "embedding batch failed, leaving embeddings empty for this batch");
                    }
                }
                offset += chunk.len();
            }
        }

        let chunks = self.build_chunks(project_id, file, &symbols).await;

        self.storage.delete_symbols_by_file(project_id, &file.relative_path).await?;
        self.storage.delete_chunks_by_file(project_id, &file.relative_path).await?;
        let count = symbols.len() as u32;
        self.storage.save_code_symbols(&symbols).await?;
        if !chunks.is_empty() {
            self.storage.save_chunks(&chunks).await?;
        }
        self.storage
            .upsert_code_file(&CodeFile {
                project_id: project_id.to_string(),
                file_path: file.relative_path.clone(),
                language: file.language.as_str().to_string(),
                file_hash: file.content_hash.clone(),
                symbols_count: count,
                indexed_at: now_ts(),
            })
            .await?;

        Ok(count)
    }

    /// Splits symbols whose `source_code` exceeds `chunk_threshold_bytes`
    /// into fixed-size windows for the hybrid search path, embedding each
    /// window independently of the symbol's own embedding.
    async fn build_chunks(&self, project_id: &str, file: &ScannedFile, symbols: &[CodeSymbol]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut chunk_index = 0u32;
        for symbol in symbols {
            let Some(source) = symbol.source_code.as_deref() else {
                continue;
            };
            if (source.len() as u64) <= self.config.chunk_threshold_bytes {
                continue;
            }
            for window in split_into_windows(source, self.config.chunk_window_bytes) {
                chunks.push(Chunk::new(
                    project_id,
                    &file.relative_path,
                    chunk_index,
                    file.language.as_str(),
                    Some(symbol.symbol_type),
                    window,
                ));
                chunk_index += 1;
            }
        }

        if chunks.is_empty() {
            return chunks;
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut offset = 0usize;
        for batch in texts.chunks(self.config.max_batch_size.max(1)) {
            match self.embedder.embed_documents(batch).await {
                Ok(vectors) if vectors.len() == batch.len() => {
                    for (i, v) in vectors.into_iter().enumerate() {
                        chunks[offset + i].embedding = Some(v);
                    }
                }
                Ok(_) => {
                    warn!(file = %file.relative_path, "chunk embedding batch size mismatch, leaving embeddings empty for this batch");
                }
                Err(e) => {
                    warn!(file = %file.relative_path, error = %e, "chunk embedding batch failed, leaving embeddings empty for this batch");
                }
            }
            offset += batch.len();
        }

        chunks
    }
}

/// Splits `text` into contiguous windows of roughly `window_bytes` each,
/// breaking only on char boundaries.
fn split_into_windows(text: &str, window_bytes: usize) -> Vec<String> {
    if window_bytes == 0 {
        return vec![text.to_string()];
    }
    let mut windows = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if current.len() >= window_bytes {
            windows.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        windows.push(current);
    }
    windows
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;
    use crate::storage::sqlite::SqliteStorage;
    use std::fs;
    use tempfile::tempdir;

    fn indexer() -> Indexer {
        let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_in_memory(2_000).unwrap());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
        Indexer::new(storage, embedder, Config::default())
    }

    #[tokio::test]
    async fn index_project_extracts_symbols_from_rust_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "pub fn add(a: i32, b: i32) -> i32 { a + b }").unwrap();

        let indexer = indexer();
        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

        let symbols = indexer.storage.find_all_symbols(&project_id).await.unwrap();
        assert!(symbols.iter().any(|s| s.name == "add"));
    }

    #[tokio::test]
    async fn reindexing_unchanged_project_is_idempotent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "pub fn add(a: i32, b: i32) -> i32 { a + b }").unwrap();

        let indexer = indexer();
        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
        let first = indexer.storage.find_all_symbols(&project_id).await.unwrap();

        let project_id_again = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
        let second = indexer.storage.find_all_symbols(&project_id_again).await.unwrap();

        assert_eq!(project_id, project_id_again);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn deleting_a_file_removes_its_symbols_on_reindex() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "pub fn a() {}").unwrap();
        fs::write(dir.path().join("b.rs"), "pub fn b() {}").unwrap();

        let indexer = indexer();
        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
        assert_eq!(indexer.storage.find_all_symbols(&project_id).await.unwrap().len(), 2);

        fs::remove_file(dir.path().join("b.rs")).unwrap();
        indexer.index_project(dir.path(), None, &cancel).await.unwrap();
        let remaining = indexer.storage.find_all_symbols(&project_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "a");
    }

    #[tokio::test]
    async fn large_symbols_are_split_into_searchable_chunks() {
        let dir = tempdir().unwrap();
        let body = "a + b".repeat(200);
        fs::write(dir.path().join("lib.rs"), format!("pub fn add(a: i32, b: i32) -> i32 {{ {body} }}")).unwrap();

        let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_in_memory(2_000).unwrap());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
        let mut config = Config::default();
        config.chunk_threshold_bytes = 64;
        config.chunk_window_bytes = 128;
        let indexer = Indexer::new(storage, embedder, config);

        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

        let query_embedding = indexer.embedder.embed_query("add").await.unwrap();
        let hits = indexer.storage.search_chunks_by_similarity(&project_id, &query_embedding, 10).await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|(c, _)| c.embedding.is_some()));
    }

    #[tokio::test]
    async fn delete_project_cascades() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "pub fn a() {}").unwrap();
        let indexer = indexer();
        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

        indexer.delete_project(&project_id).await.unwrap();
        assert!(indexer.storage.get_code_project(&project_id).await.unwrap().is_none());
        assert!(indexer.storage.find_all_symbols(&project_id).await.unwrap().is_empty());
    }
}
</content>
