//! PHP extractor: classes/interfaces/traits with methods and properties,
//! functions, and top-level constants.

use super::base::{clean_comment_text, BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct PhpExtractor;

impl LanguageExtractor for PhpExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Php]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("php", file_path, project_id, source);
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
            "class_declaration" | "interface_declaration" | "trait_declaration" => {
                extract_type(&child, base, config, parent_path, parent_id.clone(), symbols);
            }
            "function_definition" => {
                if let Some(sym) = extract_function(&child, base, config, parent_path, parent_id.clone(), SymbolType::Function) {
                    symbols.push(sym);
                }
            }
            "const_declaration" => extract_top_level_consts(&child, base, config, parent_path, symbols),
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
        "trait_declaration" => SymbolType::Trait,
        _ => SymbolType::Class,
    };
    let keyword = match node.kind() {
        "interface_declaration" => "interface",
        "trait_declaration" => "trait",
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
            "method_declaration" => {
                let symbol_type = if base.node_text(&member).contains("__construct") {
                    SymbolType::Constructor
                } else {
                    SymbolType::Method
                };
                if let Some(sym) = extract_function(&member, base, config, &name_path, Some(sym_id.clone()), symbol_type) {
                    symbols.push(sym);
                }
            }
            "property_declaration" => {
                extract_properties(&member, base, config, &name_path, &sym_id, symbols);
            }
            "const_declaration" => {
                extract_class_consts(&member, base, config, &name_path, &sym_id, symbols);
            }
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
            signature: Some(format!("function {name}{params}")),
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
    for element in node.children(&mut cursor) {
        if element.kind() != "property_element" {
            continue;
        }
        let Some(name_node) = element.child_by_field_name("name") else { continue };
        let name = base.node_text(&name_node).trim_start_matches('$');
        symbols.push(base.create_symbol(
            &element,
            SymbolType::Property,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(base.node_text(&element).to_string()),
                parent_id: Some(parent_id.to_string()),
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        ));
    }
}

fn extract_class_consts(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let mut cursor = node.walk();
    for element in node.children(&mut cursor) {
        if element.kind() != "const_element" {
            continue;
        }
        let Some(name_node) = element.child_by_field_name("name") else { continue };
        let name = base.node_text(&name_node);
        symbols.push(base.create_symbol(
            &element,
            SymbolType::Constant,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(base.node_text(&element).to_string()),
                parent_id: Some(parent_id.to_string()),
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        ));
    }
}

fn extract_top_level_consts(node: &Node, base: &BaseExtractor, config: &Config, parent_path: &str, symbols: &mut Vec<CodeSymbol>) {
    let mut cursor = node.walk();
    for element in node.children(&mut cursor) {
        if element.kind() != "const_element" {
            continue;
        }
        let Some(name_node) = element.child_by_field_name("name") else { continue };
        let name = base.node_text(&name_node);
        symbols.push(base.create_symbol(
            &element,
            SymbolType::Constant,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(base.node_text(&element).to_string()),
                parent_id: None,
                doc_string: None,
                metadata: Default::default(),
                config,
                mutation_path: false,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn class_with_constructor_and_property() {
        let src = "<?php\nclass Greeter {\n    private $name;\n    public function __construct($name) { $this->name = $name; }\n}\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Php).unwrap();
        let cfg = Config::default();
        let symbols = PhpExtractor.extract_symbols(&tree, src, "Greeter.php", "p", &cfg);
        assert!(symbols.iter().any(|s| s.name_path == "/Greeter" && s.symbol_type == SymbolType::Class));
        assert!(symbols.iter().any(|s| s.name == "__construct" && s.symbol_type == SymbolType::Constructor));
        assert!(symbols.iter().any(|s| s.name == "name" && s.symbol_type == SymbolType::Property));
    }
}
</content>
