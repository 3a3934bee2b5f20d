//! Shared helpers every language extractor builds its symbols through (the
//! "BaseExtractor" contract), generalized to the `CodeSymbol` shape of this
//! crate.

use crate::config::Config;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::Node;

const COMMENT_KINDS: &[&str] = &[
    "comment",
    "line_comment",
    "block_comment",
    "documentation_comment",
    "doc_comment",
];

pub struct SymbolOptions<'a> {
    pub signature: Option<String>,
    pub parent_id: Option<String>,
    pub doc_string: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub config: &'a Config,
    pub mutation_path: bool,
}

impl<'a> SymbolOptions<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            signature: None,
            parent_id: None,
            doc_string: None,
            metadata: serde_json::Map::new(),
            config,
            mutation_path: false,
        }
    }
}

/// Extracts text, 1-based line numbers, and half-open byte spans for a node,
/// and builds a [`CodeSymbol`] from them.
pub struct BaseExtractor<'s> {
    pub language: &'static str,
    pub file_path: &'s str,
    pub project_id: &'s str,
    pub source: &'s str,
}

impl<'s> BaseExtractor<'s> {
    pub fn new(language: &'static str, file_path: &'s str, project_id: &'s str, source: &'s str) -> Self {
        Self {
            language,
            file_path,
            project_id,
            source,
        }
    }

    pub fn node_text(&self, node: &Node) -> &'s str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_symbol(
        &self,
        node: &Node,
        symbol_type: SymbolType,
        name: &str,
        name_path: &str,
        opts: SymbolOptions,
    ) -> CodeSymbol {
        let start_byte = node.start_byte() as u32;
        let end_byte = node.end_byte() as u32;
        let mut symbol = CodeSymbol::new(
            self.project_id,
            self.file_path,
            self.language,
            symbol_type,
            name,
            name_path,
            node.start_position().row as u32 + 1,
            node.end_position().row as u32 + 1,
            start_byte,
            end_byte,
        );
        symbol.signature = opts.signature;
        symbol.parent_id = opts.parent_id;
        symbol.doc_string = opts.doc_string;
        symbol.metadata = opts.metadata.into_iter().collect();

        let cap = if opts.mutation_path {
            opts.config.max_symbol_size_mutation
        } else {
            opts.config.max_symbol_size
        };
        let text = self.node_text(node);
        if text.len() <= cap {
            symbol.source_code = Some(text.to_string());
        }
        symbol
    }

    /// Language-neutral doc comment lookup: the immediately preceding named
    /// sibling, if its node kind is a comment kind.
    pub fn preceding_comment(&self, node: &Node, config: &Config) -> Option<String> {
        if !config.extract_doc_strings {
            return None;
        }
        let mut sibling = node.prev_named_sibling()?;
        // Skip over attribute/decorator nodes that themselves precede comments
        // is extractor-specific; the base helper only looks at the immediate
        // sibling.
        if COMMENT_KINDS.contains(&sibling.kind()) {
            let text = self.node_text(&sibling).to_string();
            return Some(text);
        }
        let _ = &mut sibling;
        None
    }

    pub fn build_name_path(parent_path: &str, name: &str) -> String {
        if parent_path.is_empty() {
            format!("/{name}")
        } else {
            format!("{parent_path}/{name}")
        }
    }
}

/// Strips a single layer of `//`, `///`, `/* */`, or `#` comment markers from
/// a raw comment token, used when surfacing `doc_string` without the markers.
pub fn clean_comment_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("///") {
        return rest.trim().to_string();
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return rest.trim().to_string();
    }
    if let Some(rest) = trimmed.strip_prefix("/**") {
        return rest.trim_end_matches("*/").trim().to_string();
    }
    if let Some(rest) = trimmed.strip_prefix("/*") {
        return rest.trim_end_matches("*/").trim().to_string();
    }
    if let Some(rest) = trimmed.strip_prefix('#') {
        return rest.trim().to_string();
    }
    trimmed.to_string()
}

/// Strips surrounding triple or single quotes from a Python string literal,
/// used for the doc-string special case some languages extract.
pub fn strip_python_string_quotes(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ["\"\"\"", "'''"] {
        if let Some(inner) = trimmed.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner.trim().to_string();
        }
    }
    for quote in ["\"", "'"] {
        if let Some(inner) = trimmed.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}
</content>
