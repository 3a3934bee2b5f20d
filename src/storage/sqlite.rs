//! The concrete [`Storage`] backing: a single `rusqlite` connection guarded
//! by a `parking_lot::Mutex`. WAL mode is turned on before migrations run.

use super::{cosine_similarity, vector::HnswVectorStore, ProjectStats, Storage};
use crate::error::{CoreError, Result};
use crate::symbol::{CodeFile, CodeProject, CodeSymbol, Chunk, IndexingJob, IndexingStatus, SymbolType};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
    vector_cache: Mutex<HashMap<String, HnswVectorStore>>,
    hnsw_threshold: usize,
}

impl SqliteStorage {
    /// Opens (creating if absent) the database at `path`, enables WAL, and
    /// runs the migration ladder. `path` is conventionally
    /// `<project root>/.codescope/index.db`.
    pub fn open(path: &Path, hnsw_threshold: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        super::schema::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            vector_cache: Mutex::new(HashMap::new()),
            hnsw_threshold,
        })
    }

    pub fn open_in_memory(hnsw_threshold: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            vector_cache: Mutex::new(HashMap::new()),
            hnsw_threshold,
        })
    }

    /// Invalidates the cached vector index for a project; called whenever
    /// its symbol set changes so the next similarity query reloads fresh
    /// embeddings.
    fn invalidate_vector_cache(&self, project_id: &str) {
        self.vector_cache.lock().remove(project_id);
    }
}

fn encode_embedding(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn symbol_from_row(row: &Row) -> rusqlite::Result<CodeSymbol> {
    let symbol_type_str: String = row.get("symbol_type")?;
    let metadata_json: String = row.get("metadata")?;
    let embedding_blob: Option<Vec<u8>> = row.get("embedding")?;
    Ok(CodeSymbol {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        file_path: row.get("file_path")?,
        language: row.get("language")?,
        symbol_type: symbol_type_from_str(&symbol_type_str),
        name: row.get("name")?,
        name_path: row.get("name_path")?,
        start_line: row.get("start_line")?,
        end_line: row.get("end_line")?,
        start_byte: row.get("start_byte")?,
        end_byte: row.get("end_byte")?,
        signature: row.get("signature")?,
        doc_string: row.get("doc_string")?,
        source_code: row.get("source_code")?,
        embedding: embedding_blob.map(|b| decode_embedding(&b)),
        parent_id: row.get("parent_id")?,
        metadata: serde_json::from_str(&metadata_json).unwrap_or_default(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn symbol_type_from_str(s: &str) -> SymbolType {
    match s {
        "package" => SymbolType::Package,
        "module" => SymbolType::Module,
        "namespace" => SymbolType::Namespace,
        "class" => SymbolType::Class,
        "struct" => SymbolType::Struct,
        "interface" => SymbolType::Interface,
        "trait" => SymbolType::Trait,
        "enum" => SymbolType::Enum,
        "enum_member" => SymbolType::EnumMember,
        "type_alias" => SymbolType::TypeAlias,
        "method" => SymbolType::Method,
        "constructor" => SymbolType::Constructor,
        "property" => SymbolType::Property,
        "field" => SymbolType::Field,
        "variable" => SymbolType::Variable,
        "constant" => SymbolType::Constant,
        _ => SymbolType::Function,
    }
}

fn indexing_status_from_str(s: &str) -> IndexingStatus {
    match s {
        "in_progress" => IndexingStatus::InProgress,
        "completed" => IndexingStatus::Completed,
        "failed" => IndexingStatus::Failed,
        "cancelled" => IndexingStatus::Cancelled,
        _ => IndexingStatus::Pending,
    }
}

fn chunk_from_row(row: &Row) -> rusqlite::Result<Chunk> {
    let symbol_type: Option<String> = row.get("symbol_type")?;
    let embedding_blob: Option<Vec<u8>> = row.get("embedding")?;
    Ok(Chunk {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        file_path: row.get("file_path")?,
        chunk_index: row.get("chunk_index")?,
        language: row.get("language")?,
        symbol_type: symbol_type.map(|s| symbol_type_from_str(&s)),
        text: row.get("text")?,
        embedding: embedding_blob.map(|b| decode_embedding(&b)),
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn list_code_projects(&self) -> Result<Vec<CodeProject>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM projects ORDER BY project_id")?;
        let rows = stmt.query_map([], project_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn get_code_project(&self, project_id: &str) -> Result<Option<CodeProject>> {
        let conn = self.conn.lock();
        let project = conn
            .query_row("SELECT * FROM projects WHERE project_id = ?1", params![project_id], project_from_row)
            .optional()?;
        Ok(project)
    }

    async fn save_code_project(&self, project: &CodeProject) -> Result<()> {
        let conn = self.conn.lock();
        let language_stats = serde_json::to_string(&project.language_stats).map_err(|e| CoreError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT INTO projects (project_id, name, root_path, language_stats, last_indexed_at, indexing_status, embedding_dimension, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(project_id) DO UPDATE SET
                name = excluded.name,
                root_path = excluded.root_path,
                language_stats = excluded.language_stats,
                last_indexed_at = excluded.last_indexed_at,
                indexing_status = excluded.indexing_status,
                embedding_dimension = excluded.embedding_dimension,
                updated_at = excluded.updated_at",
            params![
                project.project_id,
                project.name,
                project.root_path,
                language_stats,
                project.last_indexed_at,
                project.indexing_status.as_str(),
                project.embedding_dimension.map(|d| d as i64),
                project.created_at,
                project.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn delete_code_project_cascade(&self, project_id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM symbols WHERE project_id = ?1", params![project_id])?;
        conn.execute("DELETE FROM chunks WHERE project_id = ?1", params![project_id])?;
        conn.execute("DELETE FROM files WHERE project_id = ?1", params![project_id])?;
        conn.execute("DELETE FROM jobs WHERE project_id = ?1", params![project_id])?;
        conn.execute("DELETE FROM projects WHERE project_id = ?1", params![project_id])?;
        drop(conn);
        self.invalidate_vector_cache(project_id);
        Ok(())
    }

    async fn upsert_code_file(&self, file: &CodeFile) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO files (project_id, file_path, language, file_hash, symbols_count, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(project_id, file_path) DO UPDATE SET
                language = excluded.language,
                file_hash = excluded.file_hash,
                symbols_count = excluded.symbols_count,
                indexed_at = excluded.indexed_at",
            params![file.project_id, file.file_path, file.language, file.file_hash, file.symbols_count, file.indexed_at],
        )?;
        Ok(())
    }

    async fn get_code_file(&self, project_id: &str, file_path: &str) -> Result<Option<CodeFile>> {
        let conn = self.conn.lock();
        let file = conn
            .query_row(
                "SELECT * FROM files WHERE project_id = ?1 AND file_path = ?2",
                params![project_id, file_path],
                file_from_row,
            )
            .optional()?;
        Ok(file)
    }

    async fn list_code_files(&self, project_id: &str) -> Result<Vec<CodeFile>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM files WHERE project_id = ?1 ORDER BY file_path")?;
        let rows = stmt.query_map(params![project_id], file_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn delete_code_file(&self, project_id: &str, file_path: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM files WHERE project_id = ?1 AND file_path = ?2", params![project_id, file_path])?;
        Ok(())
    }

    async fn save_code_symbols(&self, symbols: &[CodeSymbol]) -> Result<()> {
        if symbols.is_empty() {
            return Ok(());
        }
        let conn = self.conn.lock();
        for symbol in symbols {
            let metadata = serde_json::to_string(&symbol.metadata).map_err(|e| CoreError::Storage(e.to_string()))?;
            let embedding = symbol.embedding.as_deref().map(encode_embedding);
            conn.execute(
                "INSERT INTO symbols (id, project_id, file_path, language, symbol_type, name, name_path,
                    start_line, end_line, start_byte, end_byte, signature, doc_string, source_code,
                    embedding, parent_id, metadata, created_at, updated_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name, name_path = excluded.name_path,
                    start_line = excluded.start_line, end_line = excluded.end_line,
                    start_byte = excluded.start_byte, end_byte = excluded.end_byte,
                    signature = excluded.signature, doc_string = excluded.doc_string,
                    source_code = excluded.source_code, embedding = excluded.embedding,
                    parent_id = excluded.parent_id, metadata = excluded.metadata,
                    updated_at = excluded.updated_at",
                params![
                    symbol.id,
                    symbol.project_id,
                    symbol.file_path,
                    symbol.language,
                    symbol.symbol_type.as_str(),
                    symbol.name,
                    symbol.name_path,
                    symbol.start_line,
                    symbol.end_line,
                    symbol.start_byte,
                    symbol.end_byte,
                    symbol.signature,
                    symbol.doc_string,
                    symbol.source_code,
                    embedding,
                    symbol.parent_id,
                    metadata,
                    symbol.created_at,
                    symbol.updated_at,
                ],
            )?;
        }
        drop(conn);
        if let Some(first) = symbols.first() {
            self.invalidate_vector_cache(&first.project_id);
        }
        Ok(())
    }

    async fn delete_symbols_by_file(&self, project_id: &str, file_path: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM symbols WHERE project_id = ?1 AND file_path = ?2", params![project_id, file_path])?;
        drop(conn);
        self.invalidate_vector_cache(project_id);
        Ok(())
    }

    async fn find_symbols_by_file(&self, project_id: &str, file_path: &str) -> Result<Vec<CodeSymbol>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM symbols WHERE project_id = ?1 AND file_path = ?2 ORDER BY start_byte")?;
        let rows = stmt.query_map(params![project_id, file_path], symbol_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn find_child_symbols(&self, project_id: &str, parent_id: &str) -> Result<Vec<CodeSymbol>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM symbols WHERE project_id = ?1 AND parent_id = ?2 ORDER BY start_line")?;
        let rows = stmt.query_map(params![project_id, parent_id], symbol_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn get_symbol(&self, project_id: &str, symbol_id: &str) -> Result<Option<CodeSymbol>> {
        let conn = self.conn.lock();
        let symbol = conn
            .query_row(
                "SELECT * FROM symbols WHERE project_id = ?1 AND id = ?2",
                params![project_id, symbol_id],
                symbol_from_row,
            )
            .optional()?;
        Ok(symbol)
    }

    async fn find_symbols_by_name_path(&self, project_id: &str, name_path: &str) -> Result<Vec<CodeSymbol>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM symbols WHERE project_id = ?1 AND name_path = ?2 ORDER BY file_path, start_line")?;
        let rows = stmt.query_map(params![project_id, name_path], symbol_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn find_all_symbols(&self, project_id: &str) -> Result<Vec<CodeSymbol>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM symbols WHERE project_id = ?1 ORDER BY file_path, start_line")?;
        let rows = stmt.query_map(params![project_id], symbol_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn search_symbols_by_similarity(
        &self,
        project_id: &str,
        embedding: &[f32],
        symbol_types: Option<&[SymbolType]>,
        limit: usize,
    ) -> Result<Vec<(CodeSymbol, f32)>> {
        let all = self.find_all_symbols(project_id).await?;
        {
            let mut cache = self.vector_cache.lock();
            if !cache.contains_key(project_id) {
                let entries: Vec<(String, Vec<f32>)> = all
                    .iter()
                    .filter_map(|s| s.embedding.as_ref().map(|e| (s.id.clone(), e.clone())))
                    .collect();
                let mut store = HnswVectorStore::new(embedding.len());
                store.load(entries, self.hnsw_threshold);
                cache.insert(project_id.to_string(), store);
            }
        }
        let hits = {
            let cache = self.vector_cache.lock();
            cache.get(project_id).map(|s| s.search(embedding, limit * 4.max(limit))).unwrap_or_default()
        };
        let by_id: HashMap<&str, &CodeSymbol> = all.iter().map(|s| (s.id.as_str(), s)).collect();
        let mut results: Vec<(CodeSymbol, f32)> = hits
            .into_iter()
            .filter_map(|(id, score)| by_id.get(id.as_str()).map(|s| ((*s).clone(), score)))
            .filter(|(s, _)| symbol_types.map(|ts| ts.contains(&s.symbol_type)).unwrap_or(true))
            .collect();
        results.truncate(limit);
        Ok(results)
    }

    async fn save_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        let conn = self.conn.lock();
        for chunk in chunks {
            let embedding = chunk.embedding.as_deref().map(encode_embedding);
            conn.execute(
                "INSERT INTO chunks (id, project_id, file_path, chunk_index, language, symbol_type, text, embedding)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
                 ON CONFLICT(id) DO UPDATE SET text = excluded.text, embedding = excluded.embedding",
                params![
                    chunk.id,
                    chunk.project_id,
                    chunk.file_path,
                    chunk.chunk_index,
                    chunk.language,
                    chunk.symbol_type.map(|t| t.as_str()),
                    chunk.text,
                    embedding,
                ],
            )?;
        }
        Ok(())
    }

    async fn delete_chunks_by_file(&self, project_id: &str, file_path: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM chunks WHERE project_id = ?1 AND file_path = ?2", params![project_id, file_path])?;
        Ok(())
    }

    async fn search_chunks_by_similarity(&self, project_id: &str, embedding: &[f32], limit: usize) -> Result<Vec<(Chunk, f32)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM chunks WHERE project_id = ?1")?;
        let rows = stmt.query_map(params![project_id], chunk_from_row)?;
        let chunks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        drop(conn);
        let mut scored: Vec<(Chunk, f32)> = chunks
            .into_iter()
            .filter_map(|c| c.embedding.as_ref().map(|e| cosine_similarity(embedding, e)).map(|score| (c, score)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get_code_project_stats(&self, project_id: &str) -> Result<ProjectStats> {
        let conn = self.conn.lock();
        let mut files_by_language = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT language, COUNT(*) FROM files WHERE project_id = ?1 GROUP BY language")?;
            let mut rows = stmt.query(params![project_id])?;
            while let Some(row) = rows.next()? {
                let lang: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                files_by_language.insert(lang, count as u64);
            }
        }
        let mut symbols_by_type = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT symbol_type, COUNT(*) FROM symbols WHERE project_id = ?1 GROUP BY symbol_type")?;
            let mut rows = stmt.query(params![project_id])?;
            while let Some(row) = rows.next()? {
                let t: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                symbols_by_type.insert(t, count as u64);
            }
        }
        let total_files: i64 = conn.query_row("SELECT COUNT(*) FROM files WHERE project_id = ?1", params![project_id], |r| r.get(0))?;
        let total_symbols: i64 = conn.query_row("SELECT COUNT(*) FROM symbols WHERE project_id = ?1", params![project_id], |r| r.get(0))?;
        Ok(ProjectStats {
            files_by_language,
            symbols_by_type,
            total_files: total_files as u64,
            total_symbols: total_symbols as u64,
        })
    }

    async fn save_job(&self, job: &IndexingJob) -> Result<()> {
        let conn = self.conn.lock();
        let file_errors = serde_json::to_string(&job.file_errors).map_err(|e| CoreError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT INTO jobs (id, project_id, project_path, status, progress, files_total, files_indexed, symbols_found, started_at, completed_at, error, file_errors)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status, progress = excluded.progress,
                files_total = excluded.files_total, files_indexed = excluded.files_indexed,
                symbols_found = excluded.symbols_found, completed_at = excluded.completed_at,
                error = excluded.error, file_errors = excluded.file_errors",
            params![
                job.id,
                job.project_id,
                job.project_path,
                job.status.as_str(),
                job.progress,
                job.files_total,
                job.files_indexed,
                job.symbols_found,
                job.started_at,
                job.completed_at,
                job.error,
                file_errors,
            ],
        )?;
        Ok(())
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<IndexingJob>> {
        let conn = self.conn.lock();
        let job = conn.query_row("SELECT * FROM jobs WHERE id = ?1", params![job_id], job_from_row).optional()?;
        Ok(job)
    }

    async fn list_active_jobs(&self) -> Result<Vec<IndexingJob>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE status IN ('pending','in_progress') ORDER BY started_at")?;
        let rows = stmt.query_map([], job_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn delete_job(&self, job_id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM jobs WHERE id = ?1", params![job_id])?;
        Ok(())
    }
}

fn project_from_row(row: &Row) -> rusqlite::Result<CodeProject> {
    let language_stats_json: String = row.get("language_stats")?;
    let status: String = row.get("indexing_status")?;
    let embedding_dimension: Option<i64> = row.get("embedding_dimension")?;
    Ok(CodeProject {
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        root_path: row.get("root_path")?,
        language_stats: serde_json::from_str(&language_stats_json).unwrap_or_default(),
        last_indexed_at: row.get("last_indexed_at")?,
        indexing_status: indexing_status_from_str(&status),
        embedding_dimension: embedding_dimension.map(|d| d as usize),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn file_from_row(row: &Row) -> rusqlite::Result<CodeFile> {
    Ok(CodeFile {
        project_id: row.get("project_id")?,
        file_path: row.get("file_path")?,
        language: row.get("language")?,
        file_hash: row.get("file_hash")?,
        symbols_count: row.get("symbols_count")?,
        indexed_at: row.get("indexed_at")?,
    })
}

fn job_from_row(row: &Row) -> rusqlite::Result<IndexingJob> {
    let status: String = row.get("status")?;
    let file_errors_json: String = row.get("file_errors")?;
    Ok(IndexingJob {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        project_path: row.get("project_path")?,
        status: indexing_status_from_str(&status),
        progress: row.get("progress")?,
        files_total: row.get("files_total")?,
        files_indexed: row.get("files_indexed")?,
        symbols_found: row.get("symbols_found")?,
        started_at: row.get("started_at")?,
        completed_at: row.get("completed_at")?,
        error: row.get("error")?,
        file_errors: serde_json::from_str(&file_errors_json).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str) -> CodeProject {
        CodeProject::new(id, "demo", "/tmp/demo")
    }

    #[tokio::test]
    async fn save_and_fetch_project_round_trips() {
        let storage = SqliteStorage::open_in_memory(2_000).unwrap();
        let p = project("demo_proj");
        storage.save_code_project(&p).await.unwrap();
        let fetched = storage.get_code_project("demo_proj").await.unwrap().unwrap();
        assert_eq!(fetched.name, "demo");
    }

    #[tokio::test]
    async fn delete_cascade_removes_symbols_and_files() {
        let storage = SqliteStorage::open_in_memory(2_000).unwrap();
        storage.save_code_project(&project("demo_proj")).await.unwrap();
        let mut sym = CodeSymbol::new("demo_proj", "a.rs", "rust", SymbolType::Function, "f", "/f", 1, 1, 0, 1);
        sym.embedding = Some(vec![1.0, 0.0]);
        storage.save_code_symbols(&[sym]).await.unwrap();
        storage
            .upsert_code_file(&CodeFile {
                project_id: "demo_proj".into(),
                file_path: "a.rs".into(),
                language: "rust".into(),
                file_hash: "abc".into(),
                symbols_count: 1,
                indexed_at: 0,
            })
            .await
            .unwrap();

        storage.delete_code_project_cascade("demo_proj").await.unwrap();
        assert!(storage.find_all_symbols("demo_proj").await.unwrap().is_empty());
        assert!(storage.list_code_files("demo_proj").await.unwrap().is_empty());
        assert!(storage.get_code_project("demo_proj").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn similarity_search_ranks_closest_first() {
        let storage = SqliteStorage::open_in_memory(2_000).unwrap();
        storage.save_code_project(&project("demo_proj")).await.unwrap();
        let mut near = CodeSymbol::new("demo_proj", "a.rs", "rust", SymbolType::Function, "near", "/near", 1, 1, 0, 1);
        near.embedding = Some(vec![1.0, 0.0]);
        let mut far = CodeSymbol::new("demo_proj", "a.rs", "rust", SymbolType::Function, "far", "/far", 2, 2, 2, 3);
        far.embedding = Some(vec![0.0, 1.0]);
        storage.save_code_symbols(&[near, far]).await.unwrap();

        let hits = storage.search_symbols_by_similarity("demo_proj", &[1.0, 0.0], None, 5).await.unwrap();
        assert_eq!(hits[0].0.name, "near");
    }
}
</content>
