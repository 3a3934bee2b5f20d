//! Generic Extractor: the fallback used for any recognized language lacking
//! a dedicated extractor. Produces a single root `module` symbol spanning
//! the whole file (never fails, never emits zero symbols for a non-empty file).

use super::base::{BaseExtractor, SymbolOptions};
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::Tree;

pub fn extract_generic(
    tree: &Tree,
    source: &str,
    file_path: &str,
    project_id: &str,
    language: Language,
    config: &Config,
) -> Vec<CodeSymbol> {
    if source.trim().is_empty() {
        return Vec::new();
    }
    let base = BaseExtractor::new(language.as_str(), file_path, project_id, source);
    let name = file_path.rsplit('/').next().unwrap_or(file_path);
    vec![base.create_symbol(
        &tree.root_node(),
        SymbolType::Module,
        name,
        &format!("/{name}"),
        SymbolOptions {
            signature: None,
            parent_id: None,
            doc_string: None,
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn non_empty_file_yields_one_root_symbol() {
        let src = "fn main() {}\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Rust).unwrap();
        let cfg = Config::default();
        let symbols = extract_generic(&tree, src, "weird.rs", "p", Language::Rust, &cfg);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].symbol_type, SymbolType::Module);
    }

    #[test]
    fn empty_file_yields_no_symbols() {
        let src = "";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Rust).unwrap();
        let cfg = Config::default();
        let symbols = extract_generic(&tree, src, "empty.rs", "p", Language::Rust, &cfg);
        assert!(symbols.is_empty());
    }
}
</content>
