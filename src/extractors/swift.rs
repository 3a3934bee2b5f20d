//! Swift extractor: classes/structs/protocols/enums with their members,
//! plus top-level functions.

use super::base::{clean_comment_text, BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct SwiftExtractor;

impl LanguageExtractor for SwiftExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Swift]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("swift", file_path, project_id, source);
        let mut symbols = Vec::new();
        walk(tree.root_node(), &base, config, "", None, &mut symbols);
        symbols
    }
}

fn walk(
    node: Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    symbols: &mut Vec<CodeSymbol>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "class_declaration" => extract_type(&child, base, config, parent_path, parent_id.clone(), symbols),
            "function_declaration" => {
                if let Some(sym) = extract_function(&child, base, config, parent_path, parent_id.clone(), SymbolType::Function) {
                    symbols.push(sym);
                }
            }
            _ => walk(child, base, config, parent_path, parent_id.clone(), symbols),
        }
    }
}

/// tree-sitter-swift collapses class/struct/protocol/enum/extension under
/// `class_declaration`, distinguished by the `declaration_kind` token.
fn extract_type(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    symbols: &mut Vec<CodeSymbol>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = base.node_text(&name_node);
    let kind_text = node
        .child_by_field_name("declaration_kind")
        .map(|n| base.node_text(&n))
        .unwrap_or("class");
    let symbol_type = match kind_text {
        "struct" => SymbolType::Struct,
        "protocol" => SymbolType::Interface,
        "enum" => SymbolType::Enum,
        _ => SymbolType::Class,
    };
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    let sym = base.create_symbol(
        node,
        symbol_type,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("{kind_text} {name}")),
            parent_id,
            doc_string: base.preceding_comment(node, config).map(|c| clean_comment_text(&c)),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    );
    let sym_id = sym.id.clone();
    symbols.push(sym);

    let Some(body) = node.child_by_field_name("body") else { return };
    let mut cursor = body.walk();
    for member in body.children(&mut cursor) {
        match member.kind() {
            "function_declaration" => {
                if let Some(sym) = extract_function(&member, base, config, &name_path, Some(sym_id.clone()), SymbolType::Method) {
                    symbols.push(sym);
                }
            }
            "init_declaration" => {
                symbols.push(base.create_symbol(
                    &member,
                    SymbolType::Constructor,
                    "init",
                    &BaseExtractor::build_name_path(&name_path, "init"),
                    SymbolOptions {
                        signature: Some(base.node_text(&member).lines().next().unwrap_or("init").to_string()),
                        parent_id: Some(sym_id.clone()),
                        doc_string: None,
                        metadata: Default::default(),
                        config,
                        mutation_path: false,
                    },
                ));
            }
            "property_declaration" => extract_properties(&member, base, config, &name_path, &sym_id, symbols),
            "class_declaration" => extract_type(&member, base, config, &name_path, Some(sym_id.clone()), symbols),
            _ => {}
        }
    }
}

fn extract_function(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    symbol_type: SymbolType,
) -> Option<CodeSymbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = base.node_text(&name_node);
    let params = node
        .child_by_field_name("parameters")
        .map(|n| base.node_text(&n))
        .unwrap_or("()");
    Some(base.create_symbol(
        node,
        symbol_type,
        name,
        &BaseExtractor::build_name_path(parent_path, name),
        SymbolOptions {
            signature: Some(format!("func {name}{params}")),
            parent_id,
            doc_string: base.preceding_comment(node, config).map(|c| clean_comment_text(&c)),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_properties(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let mut cursor = node.walk();
    for pattern in node.children(&mut cursor) {
        if pattern.kind() != "pattern" && pattern.kind() != "value_binding_pattern" {
            continue;
        }
        let mut pcursor = pattern.walk();
        for ident in pattern.children(&mut pcursor).filter(|c| c.kind() == "simple_identifier") {
            let name = base.node_text(&ident);
            symbols.push(base.create_symbol(
                &pattern,
                SymbolType::Property,
                name,
                &BaseExtractor::build_name_path(parent_path, name),
                SymbolOptions {
                    signature: Some(base.node_text(&pattern).to_string()),
                    parent_id: Some(parent_id.to_string()),
                    doc_string: None,
                    metadata: Default::default(),
                    config,
                    mutation_path: false,
                },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn top_level_function_is_extracted() {
        let src = "func greet(name: String) -> String {\n    return \"hi \" + name\n}\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Swift).unwrap();
        let cfg = Config::default();
        let symbols = SwiftExtractor.extract_symbols(&tree, src, "Greeter.swift", "p", &cfg);
        assert!(symbols.iter().any(|s| s.name == "greet" && s.symbol_type == SymbolType::Function));
    }
}
</content>
