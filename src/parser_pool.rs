//! Parser Pool: a process-wide, thread-safe cache of one tree-sitter
//! parser per [`Language`].
//!
//! Concurrent callers of *different* languages do not block each other: each
//! language owns its own mutex. Concurrent callers of the *same* language
//! serialize on that language's mutex, since a single `tree_sitter::Parser`
//! is not reentrant.

use crate::error::{CoreError, Result};
use crate::registry::Language;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tree_sitter::Parser;

/// Cooperative cancellation flag threaded through a parse call. tree-sitter
/// polls this between parsing steps and aborts with a `None` tree when it
/// becomes non-zero.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicUsize>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicUsize::new(0)))
    }

    pub fn cancel(&self) {
        self.0.store(1, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst) != 0
    }

    fn raw(&self) -> Arc<AtomicUsize> {
        self.0.clone()
    }
}

fn tree_sitter_language(language: Language) -> Result<tree_sitter::Language> {
    Ok(match language {
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Language::JavaScript | Language::Jsx | Language::Vue => {
            tree_sitter_javascript::LANGUAGE.into()
        }
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        Language::Swift => tree_sitter_swift::LANGUAGE.into(),
        Language::Markdown => tree_sitter_md::LANGUAGE.into(),
    })
}

pub struct ParserPool {
    parsers: RwLock<HashMap<Language, Arc<Mutex<Parser>>>>,
}

impl ParserPool {
    pub fn new() -> Self {
        Self {
            parsers: RwLock::new(HashMap::new()),
        }
    }

    fn parser_for(&self, language: Language) -> Result<Arc<Mutex<Parser>>> {
        if let Some(p) = self.parsers.read().get(&language) {
            return Ok(p.clone());
        }
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_language(language)?)
            .map_err(|e| CoreError::Parse {
                path: String::new(),
                message: format!("failed to set grammar for {}: {e}", language.as_str()),
            })?;
        let arc = Arc::new(Mutex::new(parser));
        self.parsers.write().insert(language, arc.clone());
        Ok(arc)
    }

    /// Parse `bytes` as `language`. Fails with [`CoreError::UnsupportedLanguage`]
    /// if the grammar binding itself is missing (never happens for a
    /// [`Language`] variant, but kept for forward compatibility).
    pub fn parse(&self, bytes: &[u8], language: Language) -> Result<tree_sitter::Tree> {
        self.parse_cancellable(bytes, language, &CancellationToken::new())
    }

    pub fn parse_cancellable(
        &self,
        bytes: &[u8],
        language: Language,
        token: &CancellationToken,
    ) -> Result<tree_sitter::Tree> {
        let parser = self.parser_for(language)?;
        let mut guard = parser.lock();
        unsafe {
            guard.set_cancellation_flag(Some(&token.raw()));
        }
        let tree = guard.parse(bytes, None);
        unsafe {
            guard.set_cancellation_flag(None::<&AtomicUsize>);
        }
        tree.ok_or_else(|| CoreError::Parse {
            path: String::new(),
            message: "parser returned no tree (cancelled or OOM)".into(),
        })
    }

    pub fn parse_incremental(
        &self,
        bytes: &[u8],
        language: Language,
        previous_tree: &tree_sitter::Tree,
    ) -> Result<tree_sitter::Tree> {
        let parser = self.parser_for(language)?;
        let mut guard = parser.lock();
        guard.parse(bytes, Some(previous_tree)).ok_or_else(|| CoreError::Parse {
            path: String::new(),
            message: "incremental parse returned no tree".into(),
        })
    }
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rust_source() {
        let pool = ParserPool::new();
        let tree = pool.parse(b"fn main() {}", Language::Rust).unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[test]
    fn different_languages_each_get_their_own_parser() {
        let pool = ParserPool::new();
        let rust_tree = pool.parse(b"fn main() {}", Language::Rust).unwrap();
        let go_tree = pool.parse(b"package main", Language::Go).unwrap();
        assert_eq!(rust_tree.root_node().kind(), "source_file");
        assert_eq!(go_tree.root_node().kind(), "source_file");
    }
}
</content>
