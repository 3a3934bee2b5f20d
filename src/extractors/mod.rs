//! Symbol Extractors: one AST walker per supported language, dispatched
//! by the [`ExtractorManager`].

pub mod base;
pub mod c;
pub mod generic;
pub mod go;
pub mod java;
pub mod javascript;
pub mod markdown;
pub mod php;
pub mod python;
pub mod rust;
pub mod swift;
pub mod vue;

use crate::config::Config;
use crate::registry::Language;
use crate::symbol::CodeSymbol;
use tree_sitter::Tree;

/// Extracts the hierarchical symbol set of one parsed file. Stateless: a
/// registry maps language tag to one implementation, and new languages are
/// added by registering one more.
pub trait LanguageExtractor: Send + Sync {
    fn languages(&self) -> &'static [Language];
    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol>;
}

pub struct ExtractorManager {
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

impl ExtractorManager {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(rust::RustExtractor),
                Box::new(go::GoExtractor),
                Box::new(python::PythonExtractor),
                Box::new(javascript::JavaScriptExtractor),
                Box::new(java::JavaExtractor),
                Box::new(c::CExtractor),
                Box::new(php::PhpExtractor),
                Box::new(swift::SwiftExtractor),
                Box::new(markdown::MarkdownExtractor),
                Box::new(vue::VueExtractor),
            ],
        }
    }

    fn find(&self, language: Language) -> Option<&dyn LanguageExtractor> {
        self.extractors
            .iter()
            .find(|e| e.languages().contains(&language))
            .map(|b| b.as_ref())
    }

    /// Extract symbols for `language`, falling back to the Generic Extractor
    /// when no dedicated implementation is registered for it.
    pub fn extract(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        language: Language,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        match self.find(language) {
            Some(extractor) => extractor.extract_symbols(tree, source, file_path, project_id, config),
            None => generic::extract_generic(tree, source, file_path, project_id, language, config),
        }
    }
}

impl Default for ExtractorManager {
    fn default() -> Self {
        Self::new()
    }
}
</content>
