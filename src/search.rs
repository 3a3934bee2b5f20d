//! Search Surface: read-only views over an indexed project, from a
//! flat file overview to embedding-backed semantic and hybrid search. Every
//! operation takes `project_id` and returns results bounded by a per-call
//! limit; none of it mutates storage.

use crate::embedder::Embedder;
use crate::error::{CoreError, Result};
use crate::storage::Storage;
use crate::symbol::{CodeSymbol, SymbolType};
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SymbolOverview {
    pub name: String,
    pub symbol_type: SymbolType,
    pub name_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub signature: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SymbolMatch {
    pub symbol: CodeSymbol,
    pub children: Vec<SymbolMatch>,
}

#[derive(Debug, Clone)]
pub struct ScoredSymbol {
    pub symbol: CodeSymbol,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct PatternHit {
    pub symbol: CodeSymbol,
    pub line: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ReferenceHit {
    pub symbol: CodeSymbol,
    pub lines: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolFilter {
    pub languages: Option<Vec<String>>,
    pub symbol_types: Option<Vec<SymbolType>>,
}

impl SymbolFilter {
    fn matches(&self, symbol: &CodeSymbol) -> bool {
        if let Some(langs) = &self.languages {
            if !langs.iter().any(|l| l == &symbol.language) {
                return false;
            }
        }
        if let Some(types) = &self.symbol_types {
            if !types.contains(&symbol.symbol_type) {
                return false;
            }
        }
        true
    }
}

const PATTERN_SCAN_CAP: usize = 500;
const REGEX_MATCHES_PER_SYMBOL: usize = 5;

pub struct SearchSurface {
    storage: Arc<dyn Storage>,
    embedder: Arc<dyn Embedder>,
}

impl SearchSurface {
    pub fn new(storage: Arc<dyn Storage>, embedder: Arc<dyn Embedder>) -> Self {
        Self { storage, embedder }
    }

    /// Top-level symbols (no `parent_id`) of one file, in source order.
    pub async fn get_symbols_overview(&self, project_id: &str, relative_path: &str, max_results: usize) -> Result<Vec<SymbolOverview>> {
        let mut symbols = self.storage.find_symbols_by_file(project_id, relative_path).await?;
        symbols.retain(|s| s.parent_id.is_none());
        symbols.sort_by_key(|s| s.start_line);
        symbols.truncate(max_results.max(1));
        Ok(symbols
            .into_iter()
            .map(|s| SymbolOverview {
                name: s.name,
                symbol_type: s.symbol_type,
                name_path: s.name_path,
                start_line: s.start_line,
                end_line: s.end_line,
                signature: s.signature,
            })
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn find_symbol(
        &self,
        project_id: &str,
        name_path_pattern: &str,
        relative_path: Option<&str>,
        filter: &SymbolFilter,
        depth: u32,
        substring_matching: bool,
    ) -> Result<Vec<SymbolMatch>> {
        let mut all = self.storage.find_all_symbols(project_id).await?;
        all.retain(|s| filter.matches(s));

        if let Some(scope) = relative_path {
            if let Some(dir) = scope.strip_suffix('/') {
                all.retain(|s| s.file_path.starts_with(dir));
            } else {
                all.retain(|s| s.file_path == scope);
            }
        }

        let matched: Vec<CodeSymbol> = all
            .iter()
            .filter(|s| matches_name_path_pattern(s, name_path_pattern, substring_matching))
            .cloned()
            .collect();

        let mut results = Vec::with_capacity(matched.len());
        for symbol in matched {
            let children = if depth > 0 {
                self.attach_children(&all, &symbol.id, depth).await?
            } else {
                Vec::new()
            };
            results.push(SymbolMatch { symbol, children });
        }
        results.sort_by_key(|m| m.symbol.start_line);
        Ok(results)
    }

    async fn attach_children(&self, pool: &[CodeSymbol], parent_id: &str, depth: u32) -> Result<Vec<SymbolMatch>> {
        if depth == 0 {
            return Ok(Vec::new());
        }
        let mut children: Vec<CodeSymbol> = pool.iter().filter(|s| s.parent_id.as_deref() == Some(parent_id)).cloned().collect();
        children.sort_by_key(|c| c.start_line);

        let mut results = Vec::with_capacity(children.len());
        for child in children.drain(..) {
            let grandchildren = Box::pin(self.attach_children(pool, &child.id, depth - 1)).await?;
            results.push(SymbolMatch { symbol: child, children: grandchildren });
        }
        Ok(results)
    }

    pub async fn search_symbols_semantic(
        &self,
        project_id: &str,
        query: &str,
        limit: usize,
        filter: &SymbolFilter,
    ) -> Result<Vec<ScoredSymbol>> {
        let embedding = self.embedder.embed_query(query).await?;
        let hits = self.storage.search_symbols_by_similarity(project_id, &embedding, filter.symbol_types.as_deref(), limit * 2).await?;
        let mut results: Vec<ScoredSymbol> = hits
            .into_iter()
            .filter(|(s, _)| filter.matches(s))
            .map(|(symbol, score)| ScoredSymbol { symbol, score })
            .collect();
        results.truncate(limit);
        Ok(results)
    }

    pub async fn search_pattern(
        &self,
        project_id: &str,
        pattern: &str,
        is_regex: bool,
        case_sensitive: bool,
        filter: &SymbolFilter,
        limit: usize,
    ) -> Result<Vec<PatternHit>> {
        let mut symbols = self.storage.find_all_symbols(project_id).await?;
        symbols.retain(|s| filter.matches(s) && s.source_code.is_some());
        symbols.truncate(PATTERN_SCAN_CAP);

        let regex = if is_regex {
            Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(!case_sensitive)
                    .build()
                    .map_err(|e| CoreError::InvalidArgument(e.to_string()))?,
            )
        } else {
            None
        };

        let mut hits = Vec::new();
        for symbol in symbols {
            let source = symbol.source_code.clone().unwrap_or_default();
            let per_symbol = self.match_pattern_in_source(&source, pattern, &regex, case_sensitive, symbol.start_line);
            for (line, text) in per_symbol {
                hits.push(PatternHit { symbol: symbol.clone(), line, text });
                if hits.len() >= limit {
                    return Ok(hits);
                }
            }
        }
        Ok(hits)
    }

    fn match_pattern_in_source(
        &self,
        source: &str,
        pattern: &str,
        regex: &Option<Regex>,
        case_sensitive: bool,
        start_line: u32,
    ) -> Vec<(u32, String)> {
        let mut found = Vec::new();
        for (offset, line) in source.lines().enumerate() {
            let line_number = start_line + offset as u32;
            match regex {
                Some(re) => {
                    for m in re.find_iter(line) {
                        found.push((line_number, m.as_str().to_string()));
                        if found.len() >= REGEX_MATCHES_PER_SYMBOL {
                            return found;
                        }
                    }
                }
                None => {
                    let contains = if case_sensitive {
                        line.contains(pattern)
                    } else {
                        line.to_lowercase().contains(&pattern.to_lowercase())
                    };
                    if contains {
                        found.push((line_number, line.to_string()));
                    }
                }
            }
        }
        found
    }

    pub async fn find_references(&self, project_id: &str, target_name: &str, filter: &SymbolFilter, limit: usize) -> Result<Vec<ReferenceHit>> {
        let mut symbols = self.storage.find_all_symbols(project_id).await?;
        symbols.retain(|s| filter.matches(s) && s.name != target_name && s.source_code.is_some());

        let mut hits = Vec::new();
        for symbol in symbols.drain(..) {
            let source = symbol.source_code.clone().unwrap_or_default();
            if !source.contains(target_name) {
                continue;
            }
            let lines: Vec<u32> = source
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains(target_name))
                .map(|(i, _)| symbol.start_line + i as u32)
                .collect();
            if !lines.is_empty() {
                hits.push(ReferenceHit { symbol, lines });
                if hits.len() >= limit {
                    break;
                }
            }
        }
        Ok(hits)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn hybrid_search(
        &self,
        project_id: &str,
        query: &str,
        filter: &SymbolFilter,
        path_pattern: Option<&str>,
        include_chunks: bool,
        limit: usize,
    ) -> Result<Vec<ScoredSymbol>> {
        let embedding = self.embedder.embed_query(query).await?;
        let path_glob = path_pattern.map(glob::Pattern::new).transpose().map_err(|e| CoreError::InvalidArgument(e.to_string()))?;

        let symbol_hits = self.storage.search_symbols_by_similarity(project_id, &embedding, filter.symbol_types.as_deref(), limit * 2).await?;
        let mut merged: Vec<ScoredSymbol> = symbol_hits
            .into_iter()
            .filter(|(s, _)| filter.matches(s) && path_allows(&path_glob, &s.file_path))
            .map(|(symbol, score)| ScoredSymbol { symbol, score })
            .collect();

        if include_chunks {
            let chunk_hits = self.storage.search_chunks_by_similarity(project_id, &embedding, limit).await?;
            for (chunk, score) in chunk_hits {
                if !path_allows(&path_glob, &chunk.file_path) {
                    continue;
                }
                if let Some(symbol_type) = chunk.symbol_type {
                    if let Some(types) = &filter.symbol_types {
                        if !types.contains(&symbol_type) {
                            continue;
                        }
                    }
                }
                let mut placeholder = CodeSymbol::new(
                    project_id,
                    &chunk.file_path,
                    "",
                    chunk.symbol_type.unwrap_or(SymbolType::Module),
                    &chunk.file_path,
                    &chunk.file_path,
                    0,
                    0,
                    0,
                    0,
                );
                placeholder.source_code = Some(chunk.text);
                merged.push(ScoredSymbol { symbol: placeholder, score });
            }
        }

        merged.truncate(limit);
        Ok(merged)
    }
}

fn matches_name_path_pattern(symbol: &CodeSymbol, pattern: &str, substring_matching: bool) -> bool {
    if let Some(exact) = pattern.strip_prefix('/') {
        return symbol.name_path == format!("/{exact}");
    }
    if pattern.contains('/') {
        return symbol.name_path.contains(pattern);
    }
    if substring_matching {
        symbol.name.contains(pattern)
    } else {
        symbol.name == pattern
    }
}

/// `*` stays within one path component, `**` crosses directory separators —
/// the same distinction the `glob` crate draws when a pattern component is
/// literally `**`.
fn path_allows(pattern: &Option<glob::Pattern>, file_path: &str) -> bool {
    match pattern {
        Some(p) => p.matches(file_path),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::embedder::HashEmbedder;
    use crate::indexer::Indexer;
    use crate::parser_pool::CancellationToken;
    use crate::storage::sqlite::SqliteStorage;
    use std::fs;
    use tempfile::tempdir;

    async fn indexed(source_files: &[(&str, &str)]) -> (SearchSurface, String) {
        let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_in_memory(2_000).unwrap());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
        let indexer = Indexer::new(storage.clone(), embedder.clone(), Config::default());

        let dir = tempdir().unwrap();
        for (name, content) in source_files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let cancel = CancellationToken::new();
        let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
        (SearchSurface::new(storage, embedder), project_id)
    }

    #[tokio::test]
    async fn get_symbols_overview_returns_only_top_level_symbols() {
        let (search, project_id) = indexed(&[("lib.rs", "pub struct Foo { pub x: i32 }\npub fn bar() {}\n")]).await;
        let overview = search.get_symbols_overview(&project_id, "lib.rs", 100).await.unwrap();
        let names: Vec<&str> = overview.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"Foo"));
        assert!(names.contains(&"bar"));
        assert!(!names.contains(&"x"));
    }

    #[tokio::test]
    async fn find_symbol_exact_name_path_requires_leading_slash() {
        let (search, project_id) = indexed(&[("lib.rs", "pub fn add() {}\n")]).await;
        let found = search.find_symbol(&project_id, "/add", None, &SymbolFilter::default(), 0, false).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].symbol.name, "add");
    }

    #[tokio::test]
    async fn find_symbol_substring_matching_on_bare_name() {
        let (search, project_id) = indexed(&[("lib.rs", "pub fn add_numbers() {}\n")]).await;
        let found = search.find_symbol(&project_id, "add", None, &SymbolFilter::default(), 0, true).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn search_pattern_substring_mode_finds_matching_lines() {
        let (search, project_id) = indexed(&[("lib.rs", "pub fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n")]).await;
        let hits = search.search_pattern(&project_id, "a + b", false, true, &SymbolFilter::default(), 50).await.unwrap();
        assert!(!hits.is_empty());
    }

    #[tokio::test]
    async fn find_references_is_textual_not_name_resolved() {
        let (search, project_id) = indexed(&[(
            "lib.rs",
            "pub fn helper() {}\npub fn caller() {\n    helper();\n}\n",
        )])
        .await;
        let hits = search.find_references(&project_id, "helper", &SymbolFilter::default(), 50).await.unwrap();
        assert!(hits.iter().any(|h| h.symbol.name == "caller"));
    }

    #[tokio::test]
    async fn hybrid_search_respects_glob_path_filter() {
        let (search, project_id) = indexed(&[("lib.rs", "pub fn thing() {}\n")]).await;
        let matches = search
            .hybrid_search(&project_id, "thing", &SymbolFilter::default(), Some("nope/**"), false, 20)
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn glob_pattern_double_star_crosses_separators() {
        let pattern = Some(glob::Pattern::new("src/**").unwrap());
        assert!(path_allows(&pattern, "src/a/b.rs"));
        let pattern = Some(glob::Pattern::new("src/*").unwrap());
        assert!(!path_allows(&pattern, "src/a/b.rs"));
        assert!(path_allows(&pattern, "src/b.rs"));
    }
}
