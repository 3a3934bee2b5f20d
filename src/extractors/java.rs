//! Java extractor: classes, interfaces, enums, records, methods,
//! constructors, and fields, adapted to Java's grammar field names.

use super::base::{clean_comment_text, BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct JavaExtractor;

impl LanguageExtractor for JavaExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Java]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("java", file_path, project_id, source);
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
            "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {
                extract_type(&child, base, config, parent_path, parent_id.clone(), symbols);
            }
            _ => walk(child, base, config, parent_path, parent_id.clone(), symbols),
        }
    }
}

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
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    let symbol_type = match node.kind() {
        "interface_declaration" => SymbolType::Interface,
        "enum_declaration" => SymbolType::Enum,
        _ => SymbolType::Class,
    };
    let keyword = match node.kind() {
        "interface_declaration" => "interface",
        "enum_declaration" => "enum",
        "record_declaration" => "record",
        _ => "class",
    };
    let sym = base.create_symbol(
        node,
        symbol_type,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("{keyword} {name}")),
            parent_id,
            doc_string: preceding_javadoc(node, base, config),
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
            "method_declaration" | "constructor_declaration" => {
                if let Some(sym) = extract_method(&member, base, config, &name_path, sym_id.clone()) {
                    symbols.push(sym);
                }
            }
            "field_declaration" => {
                extract_fields(&member, base, config, &name_path, &sym_id, symbols);
            }
            "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {
                extract_type(&member, base, config, &name_path, Some(sym_id.clone()), symbols);
            }
            "enum_body_declarations" => {
                walk(member, base, config, &name_path, Some(sym_id.clone()), symbols);
            }
            _ => {}
        }
    }
}

fn extract_method(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: String,
) -> Option<CodeSymbol> {
    let name = if node.kind() == "constructor_declaration" {
        base.node_text(&node.child_by_field_name("name")?)
    } else {
        base.node_text(&node.child_by_field_name("name")?)
    };
    let params = node
        .child_by_field_name("parameters")
        .map(|n| base.node_text(&n))
        .unwrap_or("()");
    let symbol_type = if node.kind() == "constructor_declaration" {
        SymbolType::Constructor
    } else {
        SymbolType::Method
    };
    Some(base.create_symbol(
        node,
        symbol_type,
        name,
        &BaseExtractor::build_name_path(parent_path, name),
        SymbolOptions {
            signature: Some(format!("{name}{params}")),
            parent_id: Some(parent_id),
            doc_string: preceding_javadoc(node, base, config),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_fields(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let is_final = base.node_text(node).contains("final");
    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else { continue };
        let name = base.node_text(&name_node);
        let symbol_type = if is_final { SymbolType::Constant } else { SymbolType::Field };
        symbols.push(base.create_symbol(
            &declarator,
            symbol_type,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(base.node_text(&declarator).to_string()),
                parent_id: Some(parent_id.to_string()),
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        ));
    }
}

fn preceding_javadoc(node: &Node, base: &BaseExtractor, config: &Config) -> Option<String> {
    base.preceding_comment(node, config).map(|c| clean_comment_text(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn class_with_method_and_field() {
        let src = "public class Widget {\n    private final int count;\n    public int get() { return count; }\n}\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Java).unwrap();
        let cfg = Config::default();
        let symbols = JavaExtractor.extract_symbols(&tree, src, "Widget.java", "p", &cfg);
        assert!(symbols.iter().any(|s| s.name_path == "/Widget" && s.symbol_type == SymbolType::Class));
        assert!(symbols.iter().any(|s| s.name_path == "/Widget/get" && s.symbol_type == SymbolType::Method));
        assert!(symbols.iter().any(|s| s.name_path == "/Widget/count" && s.symbol_type == SymbolType::Constant));
    }
}
</content>
