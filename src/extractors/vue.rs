//! Vue extractor: a `.vue` Single File Component's `<script>` or
//! `<script setup>` block is re-parsed with the TypeScript grammar and
//! extracted exactly like a `.ts` file, rooted under a `Component` module
//! symbol so template/style blocks stay out of the symbol tree.

use super::base::{BaseExtractor, SymbolOptions};
use super::javascript::extract_from_node;
use super::LanguageExtractor;
use crate::config::Config;
use crate::parser_pool::ParserPool;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct VueExtractor;

impl LanguageExtractor for VueExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Vue]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("vue", file_path, project_id, source);
        let component_name = file_path
            .rsplit('/')
            .next()
            .and_then(|f| f.strip_suffix(".vue"))
            .unwrap_or("Component");
        let root_path = format!("/{component_name}");
        let root_sym = base.create_symbol(
            &tree.root_node(),
            SymbolType::Module,
            component_name,
            &root_path,
            SymbolOptions {
                signature: Some(format!("component {component_name}")),
                parent_id: None,
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        );
        let mut symbols = vec![];
        if let Some((script_src, byte_offset)) = find_script_block(tree.root_node(), source) {
            if let Ok(script_tree) = ParserPool::new().parse(script_src.as_bytes(), Language::TypeScript) {
                let script_base = BaseExtractor::new("typescript", file_path, project_id, script_src);
                let mut inner = extract_from_node(script_tree.root_node(), &script_base, config, &root_path, Some(root_sym.id.clone()));
                for sym in &mut inner {
                    sym.start_byte += byte_offset as u32;
                    sym.end_byte += byte_offset as u32;
                }
                symbols.append(&mut inner);
            }
        }
        symbols.push(root_sym);
        symbols
    }
}

/// Locates the first `<script>`/`<script setup>` element's text content and
/// its byte offset into the full `.vue` source, for span rebasing.
fn find_script_block<'s>(root: Node, source: &'s str) -> Option<(&'s str, usize)> {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "element" {
            let start_tag = child.children(&mut child.walk()).find(|c| c.kind() == "start_tag")?;
            let tag_name = start_tag.children(&mut start_tag.walk()).find(|c| c.kind() == "tag_name");
            if tag_name.map(|n| &source[n.byte_range()]) == Some("script") {
                if let Some(text) = child.children(&mut child.walk()).find(|c| c.kind() == "raw_text" || c.kind() == "text") {
                    return Some((&source[text.byte_range()], text.start_byte()));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_without_script_still_yields_root_module() {
        let src = "<template><div>hi</div></template>\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Vue).unwrap();
        let cfg = Config::default();
        let symbols = VueExtractor.extract_symbols(&tree, src, "Widget.vue", "p", &cfg);
        assert!(symbols.iter().any(|s| s.name_path == "/Widget" && s.symbol_type == SymbolType::Module));
    }
}
</content>
