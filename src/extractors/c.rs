//! C extractor: functions, structs/unions with fields, enums with members,
//! typedefs, and top-level variable declarations.

use super::base::{clean_comment_text, BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct CExtractor;

impl LanguageExtractor for CExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::C]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("c", file_path, project_id, source);
        let mut symbols = Vec::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "function_definition" => {
                    if let Some(sym) = extract_function(&child, &base, config) {
                        symbols.push(sym);
                    }
                }
                "type_definition" => extract_typedef(&child, &base, config, &mut symbols),
                "declaration" => extract_declaration(&child, &base, config, &mut symbols),
                _ => {}
            }
        }
        symbols
    }
}

fn declarator_name<'s>(node: &Node, base: &BaseExtractor<'s>) -> Option<&'s str> {
    let mut current = *node;
    loop {
        if current.kind() == "identifier" {
            return Some(base.node_text(&current));
        }
        current = current.child_by_field_name("declarator")?;
    }
}

fn extract_function(node: &Node, base: &BaseExtractor, config: &Config) -> Option<CodeSymbol> {
    let declarator = node.child_by_field_name("declarator")?;
    let name = declarator_name(&declarator, base)?;
    let return_type = node
        .child_by_field_name("type")
        .map(|n| base.node_text(&n))
        .unwrap_or("void");
    Some(base.create_symbol(
        node,
        SymbolType::Function,
        name,
        &format!("/{name}"),
        SymbolOptions {
            signature: Some(format!("{return_type} {name}{}", base.node_text(&declarator).trim_start_matches(name))),
            parent_id: None,
            doc_string: base.preceding_comment(node, config).map(|c| clean_comment_text(&c)),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_typedef(node: &Node, base: &BaseExtractor, config: &Config, symbols: &mut Vec<CodeSymbol>) {
    let Some(type_node) = node.child_by_field_name("type") else { return };
    let name = node
        .child_by_field_name("declarator")
        .and_then(|d| declarator_name(&d, base))
        .unwrap_or("");
    if name.is_empty() {
        return;
    }
    let name_path = format!("/{name}");
    match type_node.kind() {
        "struct_specifier" | "union_specifier" => {
            let sym = base.create_symbol(
                node,
                SymbolType::Struct,
                name,
                &name_path,
                SymbolOptions {
                    signature: Some(format!("typedef struct {name}")),
                    parent_id: None,
                    doc_string: base.preceding_comment(node, config).map(|c| clean_comment_text(&c)),
                    metadata: Default::default(),
                    config,
                    mutation_path: false,
                },
            );
            let sym_id = sym.id.clone();
            extract_fields(&type_node, base, config, &name_path, &sym_id, symbols);
            symbols.push(sym);
        }
        "enum_specifier" => {
            let sym = base.create_symbol(
                node,
                SymbolType::Enum,
                name,
                &name_path,
                SymbolOptions {
                    signature: Some(format!("typedef enum {name}")),
                    parent_id: None,
                    doc_string: None,
                    metadata: Default::default(),
                    config,
                    mutation_path: false,
                },
            );
            let sym_id = sym.id.clone();
            extract_enumerators(&type_node, base, config, &name_path, &sym_id, symbols);
            symbols.push(sym);
        }
        _ => {
            symbols.push(base.create_symbol(
                node,
                SymbolType::TypeAlias,
                name,
                &name_path,
                SymbolOptions {
                    signature: Some(format!("typedef {} {name}", base.node_text(&type_node))),
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

fn extract_fields(
    struct_node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let Some(field_list) = struct_node.child_by_field_name("body") else { return };
    let mut cursor = field_list.walk();
    for field in field_list.children(&mut cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let Some(declarator) = field.child_by_field_name("declarator") else { continue };
        let Some(name) = declarator_name(&declarator, base) else { continue };
        symbols.push(base.create_symbol(
            &field,
            SymbolType::Field,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(base.node_text(&field).to_string()),
                parent_id: Some(parent_id.to_string()),
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        ));
    }
}

fn extract_enumerators(
    enum_node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let Some(body) = enum_node.child_by_field_name("body") else { return };
    let mut cursor = body.walk();
    for enumerator in body.children(&mut cursor) {
        if enumerator.kind() != "enumerator" {
            continue;
        }
        let Some(name_node) = enumerator.child_by_field_name("name") else { continue };
        let name = base.node_text(&name_node);
        symbols.push(base.create_symbol(
            &enumerator,
            SymbolType::EnumMember,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(name.to_string()),
                parent_id: Some(parent_id.to_string()),
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        ));
    }
}

fn extract_declaration(node: &Node, base: &BaseExtractor, config: &Config, symbols: &mut Vec<CodeSymbol>) {
    let Some(declarator) = node.child_by_field_name("declarator") else { return };
    if declarator.kind() == "function_declarator" {
        return;
    }
    let Some(name) = declarator_name(&declarator, base) else { return };
    let is_const = base.node_text(node).contains("const");
    symbols.push(base.create_symbol(
        node,
        if is_const { SymbolType::Constant } else { SymbolType::Variable },
        name,
        &format!("/{name}"),
        SymbolOptions {
            signature: Some(base.node_text(node).trim_end_matches(';').to_string()),
            parent_id: None,
            doc_string: None,
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn function_and_typedef_struct() {
        let src = "typedef struct { int x; } Point;\nint add(int a, int b) { return a + b; }\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::C).unwrap();
        let cfg = Config::default();
        let symbols = CExtractor.extract_symbols(&tree, src, "point.c", "p", &cfg);
        assert!(symbols.iter().any(|s| s.name == "add" && s.symbol_type == SymbolType::Function));
        assert!(symbols.iter().any(|s| s.name == "Point" && s.symbol_type == SymbolType::Struct));
        assert!(symbols.iter().any(|s| s.name_path == "/Point/x"));
    }
}
</content>
