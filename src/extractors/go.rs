//! Go extractor. The package declaration becomes a single root symbol named
//! after the package (so `package demo` yields name_path `/demo`; see
//! DESIGN.md for the rationale).

use super::base::{BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct GoExtractor;

impl LanguageExtractor for GoExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Go]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("go", file_path, project_id, source);
        let mut symbols = Vec::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    if let Some(name_node) = child.children(&mut child.walk()).find(|c| c.kind() == "package_identifier") {
                        let name = base.node_text(&name_node);
                        symbols.push(base.create_symbol(
                            &child,
                            SymbolType::Package,
                            name,
                            &format!("/{name}"),
                            SymbolOptions {
                                signature: Some(format!("package {name}")),
                                parent_id: None,
                                doc_string: None,
                                metadata: Default::default(),
                                config,
                                mutation_path: false,
                            },
                        ));
                    }
                }
                "function_declaration" => {
                    if let Some(sym) = extract_function(&child, &base, config, None) {
                        symbols.push(sym);
                    }
                }
                "method_declaration" => {
                    if let Some(sym) = extract_method(&child, &base, config) {
                        symbols.push(sym);
                    }
                }
                "type_declaration" => extract_type_decls(&child, &base, config, &mut symbols),
                "const_declaration" => extract_value_decls(&child, &base, config, SymbolType::Constant, &mut symbols),
                "var_declaration" => extract_value_decls(&child, &base, config, SymbolType::Variable, &mut symbols),
                _ => {}
            }
        }
        symbols
    }
}

fn extract_function(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_id: Option<String>,
) -> Option<CodeSymbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = base.node_text(&name_node);
    let params = node
        .child_by_field_name("parameters")
        .map(|n| base.node_text(&n))
        .unwrap_or("()");
    Some(base.create_symbol(
        node,
        SymbolType::Function,
        name,
        &format!("/{name}"),
        SymbolOptions {
            signature: Some(format!("func {name}{params}")),
            parent_id,
            doc_string: base.preceding_comment(node, config).map(|c| super::base::clean_comment_text(&c)),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

/// `func (t *T) F() int { ... }` → name_path `/T.F` with leading `*` stripped
/// from the receiver.
fn extract_method(node: &Node, base: &BaseExtractor, config: &Config) -> Option<CodeSymbol> {
    let receiver = node.child_by_field_name("receiver")?;
    let receiver_type = receiver
        .children(&mut receiver.walk())
        .find(|c| matches!(c.kind(), "type_identifier" | "pointer_type"))
        .map(|n| base.node_text(&n).trim_start_matches('*').to_string())?;
    let name_node = node.child_by_field_name("name")?;
    let name = base.node_text(&name_node);
    let params = node
        .child_by_field_name("parameters")
        .map(|n| base.node_text(&n))
        .unwrap_or("()");
    let name_path = format!("/{receiver_type}.{name}");
    Some(base.create_symbol(
        node,
        SymbolType::Method,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("func ({receiver_type}) {name}{params}")),
            parent_id: None,
            doc_string: base.preceding_comment(node, config).map(|c| super::base::clean_comment_text(&c)),
            metadata: [("receiver".to_string(), serde_json::Value::String(receiver_type))]
                .into_iter()
                .collect(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_type_decls(node: &Node, base: &BaseExtractor, config: &Config, symbols: &mut Vec<CodeSymbol>) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else { continue };
        let name = base.node_text(&name_node);
        let Some(type_node) = spec.child_by_field_name("type") else { continue };
        let name_path = format!("/{name}");
        let (symbol_type, signature) = match type_node.kind() {
            "struct_type" => (SymbolType::Struct, format!("type {name} struct")),
            "interface_type" => (SymbolType::Interface, format!("type {name} interface")),
            _ => (SymbolType::TypeAlias, format!("type {name} {}", base.node_text(&type_node))),
        };
        let sym = base.create_symbol(
            &spec,
            symbol_type,
            name,
            &name_path,
            SymbolOptions {
                signature: Some(signature),
                parent_id: None,
                doc_string: base.preceding_comment(&spec, config).map(|c| super::base::clean_comment_text(&c)),
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        );
        let sym_id = sym.id.clone();
        match type_node.kind() {
            "struct_type" => extract_struct_fields(&type_node, base, config, &name_path, &sym_id, symbols),
            "interface_type" => extract_interface_methods(&type_node, base, config, &name_path, &sym_id, symbols),
            _ => {}
        }
        symbols.push(sym);
    }
}

fn extract_struct_fields(
    struct_type: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let Some(field_list) = struct_type.children(&mut struct_type.walk()).find(|c| c.kind() == "field_declaration_list") else { return };
    let mut cursor = field_list.walk();
    for field in field_list.children(&mut cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let mut fcursor = field.walk();
        for name_node in field.children(&mut fcursor).filter(|c| c.kind() == "field_identifier") {
            let name = base.node_text(&name_node);
            symbols.push(base.create_symbol(
                &field,
                SymbolType::Field,
                name,
                &BaseExtractor::build_name_path(parent_path, name),
                SymbolOptions {
                    signature: field.child_by_field_name("type").map(|t| format!("{name} {}", base.node_text(&t))),
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

fn extract_interface_methods(
    interface_type: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let mut cursor = interface_type.walk();
    for member in interface_type.children(&mut cursor) {
        if member.kind() != "method_spec" {
            continue;
        }
        let Some(name_node) = member.child_by_field_name("name") else { continue };
        let name = base.node_text(&name_node);
        symbols.push(base.create_symbol(
            &member,
            SymbolType::Method,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(base.node_text(&member).to_string()),
                parent_id: Some(parent_id.to_string()),
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        ));
    }
}

fn extract_value_decls(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    symbol_type: SymbolType,
    symbols: &mut Vec<CodeSymbol>,
) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if !matches!(spec.kind(), "const_spec" | "var_spec") {
            continue;
        }
        let mut names = spec.children(&mut spec.walk()).filter(|c| c.kind() == "identifier");
        for name_node in names.by_ref() {
            let name = base.node_text(&name_node);
            symbols.push(base.create_symbol(
                &spec,
                symbol_type,
                name,
                &format!("/{name}"),
                SymbolOptions {
                    signature: Some(name.to_string()),
                    parent_id: None,
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
    fn package_struct_and_receiver_method() {
        let src = "package demo\ntype T struct { X int }\nfunc (t *T) F() int { return t.X }\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Go).unwrap();
        let cfg = Config::default();
        let symbols = GoExtractor.extract_symbols(&tree, src, "pkg/demo.go", "p", &cfg);
        let paths: Vec<_> = symbols.iter().map(|s| s.name_path.as_str()).collect();
        assert!(paths.contains(&"/demo"));
        assert!(paths.contains(&"/T"));
        assert!(paths.contains(&"/T/X"));
        assert!(paths.contains(&"/T.F"));
    }
}
</content>
