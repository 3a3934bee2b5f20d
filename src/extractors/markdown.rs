//! Markdown extractor: ATX/setext headings become a nested outline of
//! `module`-typed symbols keyed by heading level via a heading-stack walk.

use super::base::{BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct MarkdownExtractor;

impl LanguageExtractor for MarkdownExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Markdown]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("markdown", file_path, project_id, source);
        let mut symbols = Vec::new();
        // (level, name_path, id) stack; a new heading pops anything at >= its level.
        let mut stack: Vec<(u32, String, String)> = Vec::new();
        let mut cursor = tree.root_node().walk();
        for child in tree.root_node().children(&mut cursor) {
            if !matches!(child.kind(), "atx_heading" | "setext_heading") {
                continue;
            }
            let Some((level, text_node)) = heading_level_and_text(&child) else { continue };
            let title = base.node_text(&text_node).trim();
            if title.is_empty() {
                continue;
            }
            while stack.last().map(|(l, _, _)| *l >= level).unwrap_or(false) {
                stack.pop();
            }
            let parent_path = stack.last().map(|(_, p, _)| p.as_str()).unwrap_or("");
            let parent_id = stack.last().map(|(_, _, id)| id.clone());
            let name_path = BaseExtractor::build_name_path(parent_path, title);
            let sym = base.create_symbol(
                &child,
                SymbolType::Module,
                title,
                &name_path,
                SymbolOptions {
                    signature: Some(format!("{} {title}", "#".repeat(level as usize))),
                    parent_id,
                    doc_string: None,
                    metadata: Default::default(),
                    config,
                    mutation_path: false,
                },
            );
            stack.push((level, name_path, sym.id.clone()));
            symbols.push(sym);
        }
        symbols
    }
}

fn heading_level_and_text<'a>(node: &Node<'a>) -> Option<(u32, Node<'a>)> {
    match node.kind() {
        "atx_heading" => {
            let marker = node
                .children(&mut node.walk())
                .find(|c| c.kind().starts_with("atx_h") && c.kind().ends_with("_marker"))?;
            let level = marker.kind().chars().find(|c| c.is_ascii_digit())?.to_digit(10)?;
            let content = node.children(&mut node.walk()).find(|c| c.kind() == "inline")?;
            Some((level, content))
        }
        "setext_heading" => {
            let underline = node.children(&mut node.walk()).find(|c| c.kind().starts_with("setext_h"))?;
            let level = if underline.kind().contains('1') { 1 } else { 2 };
            let content = node.children(&mut node.walk()).find(|c| c.kind() == "paragraph")?;
            Some((level, content))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn nested_headings_build_outline() {
        let src = "# Title\n\n## Section\n\ntext\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Markdown).unwrap();
        let cfg = Config::default();
        let symbols = MarkdownExtractor.extract_symbols(&tree, src, "doc.md", "p", &cfg);
        assert!(symbols.iter().any(|s| s.name_path == "/Title"));
        assert!(symbols.iter().any(|s| s.name_path == "/Title/Section"));
    }
}
</content>
