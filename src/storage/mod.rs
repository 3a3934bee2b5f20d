//! Storage Contract: the typed persistence surface the core consumes.
//! One concrete backing, [`sqlite::SqliteStorage`], is provided so the crate
//! is runnable end-to-end without a separately provisioned database.

pub mod schema;
pub mod sqlite;
pub mod vector;

use crate::error::Result;
use crate::symbol::{CodeFile, CodeProject, CodeSymbol, Chunk};
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ProjectStats {
    pub files_by_language: HashMap<String, u64>,
    pub symbols_by_type: HashMap<String, u64>,
    pub total_files: u64,
    pub total_symbols: u64,
}

/// Typed CRUD + vector kNN surface the Indexer Core, Search Surface, and
/// Mutator all depend on, never reaching for a concrete database type
/// directly.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn list_code_projects(&self) -> Result<Vec<CodeProject>>;
    async fn get_code_project(&self, project_id: &str) -> Result<Option<CodeProject>>;
    async fn save_code_project(&self, project: &CodeProject) -> Result<()>;
    async fn delete_code_project_cascade(&self, project_id: &str) -> Result<()>;

    async fn upsert_code_file(&self, file: &CodeFile) -> Result<()>;
    async fn get_code_file(&self, project_id: &str, file_path: &str) -> Result<Option<CodeFile>>;
    async fn list_code_files(&self, project_id: &str) -> Result<Vec<CodeFile>>;
    async fn delete_code_file(&self, project_id: &str, file_path: &str) -> Result<()>;

    /// Atomic per-file replace: callers must have already removed the old
    /// batch via [`Storage::delete_symbols_by_file`].
    async fn save_code_symbols(&self, symbols: &[CodeSymbol]) -> Result<()>;
    async fn delete_symbols_by_file(&self, project_id: &str, file_path: &str) -> Result<()>;
    async fn find_symbols_by_file(&self, project_id: &str, file_path: &str) -> Result<Vec<CodeSymbol>>;
    async fn find_child_symbols(&self, project_id: &str, parent_id: &str) -> Result<Vec<CodeSymbol>>;
    async fn get_symbol(&self, project_id: &str, symbol_id: &str) -> Result<Option<CodeSymbol>>;
    async fn find_symbols_by_name_path(&self, project_id: &str, name_path: &str) -> Result<Vec<CodeSymbol>>;
    async fn find_all_symbols(&self, project_id: &str) -> Result<Vec<CodeSymbol>>;

    async fn search_symbols_by_similarity(
        &self,
        project_id: &str,
        embedding: &[f32],
        symbol_types: Option<&[crate::symbol::SymbolType]>,
        limit: usize,
    ) -> Result<Vec<(CodeSymbol, f32)>>;

    async fn save_chunks(&self, chunks: &[Chunk]) -> Result<()>;
    async fn delete_chunks_by_file(&self, project_id: &str, file_path: &str) -> Result<()>;
    async fn search_chunks_by_similarity(&self, project_id: &str, embedding: &[f32], limit: usize) -> Result<Vec<(Chunk, f32)>>;

    async fn get_code_project_stats(&self, project_id: &str) -> Result<ProjectStats>;

    async fn save_job(&self, job: &crate::symbol::IndexingJob) -> Result<()>;
    async fn get_job(&self, job_id: &str) -> Result<Option<crate::symbol::IndexingJob>>;
    async fn list_active_jobs(&self) -> Result<Vec<crate::symbol::IndexingJob>>;
    async fn delete_job(&self, job_id: &str) -> Result<()>;
}

/// Cosine similarity of two equal-length vectors; `0.0` if either is a
/// zero vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
</content>
