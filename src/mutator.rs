//! Symbol Resolver & Mutator: resolves a symbol to a byte span in its
//! file, then applies one of four splice operations through a single atomic
//! write primitive (temp file in the same directory, then rename), the way
//! a single-file transaction commits its new content in one rename call.

use crate::error::{CoreError, Result};
use crate::indexer::Indexer;
use crate::storage::Storage;
use crate::symbol::CodeSymbol;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ResolvedSymbol {
    pub id: String,
    pub project_id: String,
    pub file_path: String,
    pub name_path: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: u32,
    pub end_line: u32,
    pub language: String,
    pub absolute_path: PathBuf,
}

impl ResolvedSymbol {
    fn from_symbol(symbol: CodeSymbol, absolute_path: PathBuf) -> Self {
        Self {
            id: symbol.id,
            project_id: symbol.project_id,
            file_path: symbol.file_path,
            name_path: symbol.name_path,
            start_byte: symbol.start_byte as usize,
            end_byte: symbol.end_byte as usize,
            start_line: symbol.start_line,
            end_line: symbol.end_line,
            language: symbol.language,
            absolute_path,
        }
    }
}

/// Either leg of a `resolve` lookup: by stable id, or by `name_path`
/// optionally scoped to one file.
pub enum SymbolLocator<'a> {
    Id(&'a str),
    NamePath {
        name_path: &'a str,
        relative_path: Option<&'a str>,
    },
}

pub struct Mutator {
    storage: Arc<dyn Storage>,
    indexer: Indexer,
    project_root: PathBuf,
}

impl Mutator {
    pub fn new(storage: Arc<dyn Storage>, indexer: Indexer, project_root: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            indexer,
            project_root: project_root.into(),
        }
    }

    pub async fn resolve(&self, project_id: &str, locator: SymbolLocator<'_>) -> Result<ResolvedSymbol> {
        let symbol = match locator {
            SymbolLocator::Id(symbol_id) => self
                .storage
                .get_symbol(project_id, symbol_id)
                .await?
                .ok_or_else(|| CoreError::SymbolNotFound(symbol_id.to_string()))?,
            SymbolLocator::NamePath {
                name_path,
                relative_path: Some(relative_path),
            } => self
                .storage
                .find_symbols_by_name_path(project_id, name_path)
                .await?
                .into_iter()
                .find(|s| s.file_path == relative_path)
                .ok_or_else(|| CoreError::SymbolNotFound(name_path.to_string()))?,
            SymbolLocator::NamePath {
                name_path,
                relative_path: None,
            } => {
                let mut matches = self.storage.find_symbols_by_name_path(project_id, name_path).await?;
                matches.sort_by(|a, b| (a.file_path.as_str(), a.start_line).cmp(&(b.file_path.as_str(), b.start_line)));
                matches
                    .into_iter()
                    .next()
                    .ok_or_else(|| CoreError::SymbolNotFound(name_path.to_string()))?
            }
        };

        let absolute_path = self.project_root.join(&symbol.file_path);
        Ok(ResolvedSymbol::from_symbol(symbol, absolute_path))
    }

    pub async fn replace(&self, symbol: &ResolvedSymbol, new_body: &str) -> Result<()> {
        let new_body = new_body.to_string();
        self.modify_file(&symbol.absolute_path, move |bytes| {
            let (start, end) = (symbol.start_byte, symbol.end_byte);
            if start > end || end > bytes.len() {
                return Err(CoreError::InvalidByteRange { start, end, len: bytes.len() });
            }
            let mut out = Vec::with_capacity(bytes.len() - (end - start) + new_body.len());
            out.extend_from_slice(&bytes[..start]);
            out.extend_from_slice(new_body.as_bytes());
            out.extend_from_slice(&bytes[end..]);
            Ok(out)
        })?;
        self.reindex_after(symbol).await;
        Ok(())
    }

    pub async fn insert_after(&self, symbol: &ResolvedSymbol, body: &str) -> Result<()> {
        let body = body.to_string();
        self.modify_file(&symbol.absolute_path, move |bytes| {
            let at = symbol.end_byte;
            if at > bytes.len() {
                return Err(CoreError::InvalidByteRange { start: at, end: at, len: bytes.len() });
            }
            let mut out = Vec::with_capacity(bytes.len() + body.len());
            out.extend_from_slice(&bytes[..at]);
            out.extend_from_slice(body.as_bytes());
            out.extend_from_slice(&bytes[at..]);
            Ok(out)
        })?;
        self.reindex_after(symbol).await;
        Ok(())
    }

    pub async fn insert_before(&self, symbol: &ResolvedSymbol, body: &str) -> Result<()> {
        let body = body.to_string();
        self.modify_file(&symbol.absolute_path, move |bytes| {
            let at = symbol.start_byte;
            if at > bytes.len() {
                return Err(CoreError::InvalidByteRange { start: at, end: at, len: bytes.len() });
            }
            let mut out = Vec::with_capacity(bytes.len() + body.len());
            out.extend_from_slice(&bytes[..at]);
            out.extend_from_slice(body.as_bytes());
            out.extend_from_slice(&bytes[at..]);
            Ok(out)
        })?;
        self.reindex_after(symbol).await;
        Ok(())
    }

    pub async fn delete(&self, symbol: &ResolvedSymbol) -> Result<()> {
        self.modify_file(&symbol.absolute_path, move |bytes| {
            let (start, end) = (symbol.start_byte, symbol.end_byte);
            if start > end || end > bytes.len() {
                return Err(CoreError::InvalidByteRange { start, end, len: bytes.len() });
            }
            let mut lo = start;
            while lo > 0 && bytes[lo - 1] != b'\n' {
                lo -= 1;
            }
            let mut hi = end;
            if hi < bytes.len() && bytes[hi] == b'\n' {
                hi += 1;
            }
            let mut out = Vec::with_capacity(bytes.len() - (hi - lo));
            out.extend_from_slice(&bytes[..lo]);
            out.extend_from_slice(&bytes[hi..]);
            Ok(collapse_blank_runs(&out))
        })?;
        self.reindex_after(symbol).await;
        Ok(())
    }

    async fn reindex_after(&self, symbol: &ResolvedSymbol) {
        if let Err(e) = self.indexer.reindex_file(&symbol.project_id, &symbol.file_path).await {
            warn!(
                project_id = %symbol.project_id,
                file = %symbol.file_path,
                error = %e,
                "mutation written but reindex of the edited file failed; stored symbols are stale until the next reindex"
            );
        }
    }

    /// Reads `path`, runs `mutate` over its bytes, and writes the result back
    /// via temp-file-then-rename in the same directory so a reader never
    /// observes a partially written file.
    fn modify_file(&self, path: &Path, mutate: impl FnOnce(&[u8]) -> Result<Vec<u8>>) -> Result<()> {
        let original = fs::read(path).map_err(CoreError::Io)?;
        let new_contents = mutate(&original)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("edit");
        let temp_path = dir.join(format!(".{file_name}.tmp.{}", Uuid::new_v4().simple()));

        fs::write(&temp_path, &new_contents).map_err(CoreError::Io)?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            CoreError::Io(e)
        })?;
        Ok(())
    }
}

/// Collapses runs of three or more consecutive `\n` into exactly two, the
/// whitespace cleanup the delete operation applies after removing a symbol's
/// own trailing blank line.
fn collapse_blank_runs(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut newline_run = 0usize;
    for &b in bytes {
        if b == b'\n' {
            newline_run += 1;
            if newline_run <= 2 {
                out.push(b);
            }
        } else {
            newline_run = 0;
            out.push(b);
        }
    }
    out
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

    async fn setup(dir: &Path, source: &str) -> (Mutator, String) {
        let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_in_memory(2_000).unwrap());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
        let indexer = Indexer::new(storage.clone(), embedder, Config::default());
        fs::write(dir.join("lib.rs"), source).unwrap();
        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir, None, &cancel).await.unwrap().project_id;
        (Mutator::new(storage, indexer, dir.to_path_buf()), project_id)
    }

    #[tokio::test]
    async fn replace_splices_new_body_and_reindexes() {
        let dir = tempdir().unwrap();
        let (mutator, project_id) = setup(dir.path(), "pub fn add(a: i32, b: i32) -> i32 { a + b }\n").await;

        let resolved = mutator
            .resolve(&project_id, SymbolLocator::NamePath { name_path: "/add", relative_path: None })
            .await
            .unwrap();
        mutator.replace(&resolved, "pub fn add(a: i32, b: i32) -> i32 { a * b }").await.unwrap();

        let contents = fs::read_to_string(dir.path().join("lib.rs")).unwrap();
        assert!(contents.contains("a * b"));

        let symbols = mutator.storage.find_all_symbols(&project_id).await.unwrap();
        assert!(symbols.iter().any(|s| s.name == "add"));
    }

    #[tokio::test]
    async fn insert_after_appends_following_the_symbol_span() {
        let dir = tempdir().unwrap();
        let (mutator, project_id) = setup(dir.path(), "pub fn a() {}\n").await;

        let resolved = mutator
            .resolve(&project_id, SymbolLocator::NamePath { name_path: "/a", relative_path: None })
            .await
            .unwrap();
        mutator.insert_after(&resolved, "\npub fn b() {}").await.unwrap();

        let contents = fs::read_to_string(dir.path().join("lib.rs")).unwrap();
        assert!(contents.contains("pub fn a() {}\npub fn b() {}"));
    }

    #[tokio::test]
    async fn delete_collapses_excess_blank_lines() {
        let dir = tempdir().unwrap();
        let (mutator, project_id) = setup(dir.path(), "pub fn a() {}\n\npub fn b() {}\n").await;

        let resolved = mutator
            .resolve(&project_id, SymbolLocator::NamePath { name_path: "/a", relative_path: None })
            .await
            .unwrap();
        mutator.delete(&resolved).await.unwrap();

        let contents = fs::read_to_string(dir.path().join("lib.rs")).unwrap();
        assert!(!contents.contains("fn a"));
        assert!(contents.contains("fn b"));
        assert!(!contents.contains("\n\n\n"));
    }

    #[tokio::test]
    async fn resolve_unknown_name_path_fails() {
        let dir = tempdir().unwrap();
        let (mutator, project_id) = setup(dir.path(), "pub fn a() {}\n").await;

        let err = mutator
            .resolve(&project_id, SymbolLocator::NamePath { name_path: "/nope", relative_path: None })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SymbolNotFound(_)));
    }
}
