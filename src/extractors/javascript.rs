//! TypeScript / JavaScript extractor. One walker handles all four language
//! tags since the TS grammar is a superset of the JS grammar and the symbol
//! rules are identical; the Vue extractor reuses this walker for its
//! `<script>` block.

use super::base::{BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct JavaScriptExtractor;

impl LanguageExtractor for JavaScriptExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::JavaScript, Language::Jsx, Language::TypeScript, Language::Tsx]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let lang_tag = crate::registry::LanguageRegistry::new()
            .language_for_path(std::path::Path::new(file_path))
            .unwrap_or(Language::JavaScript)
            .as_str();
        let base = BaseExtractor::new(lang_tag, file_path, project_id, source);
        extract_from_node(tree.root_node(), &base, config, "", None)
    }
}

pub(crate) fn extract_from_node(
    node: Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
) -> Vec<CodeSymbol> {
    let mut symbols = Vec::new();
    walk(node, base, config, parent_path, parent_id, &mut symbols);
    symbols
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
        let actual = if child.kind() == "export_statement" {
            child.named_child(0).unwrap_or(child)
        } else {
            child
        };
        match actual.kind() {
            "class_declaration" => extract_class(&actual, base, config, parent_path, parent_id.clone(), symbols),
            "function_declaration" | "generator_function_declaration" => {
                if let Some(sym) = extract_function(&actual, base, config, parent_path, parent_id.clone(), SymbolType::Function) {
                    symbols.push(sym);
                }
            }
            "interface_declaration" => extract_interface(&actual, base, config, parent_path, parent_id.clone(), symbols),
            "enum_declaration" => extract_enum(&actual, base, config, parent_path, parent_id.clone(), symbols),
            "type_alias_declaration" => {
                if let Some(name_node) = actual.child_by_field_name("name") {
                    let name = base.node_text(&name_node);
                    symbols.push(base.create_symbol(
                        &actual,
                        SymbolType::TypeAlias,
                        name,
                        &BaseExtractor::build_name_path(parent_path, name),
                        SymbolOptions {
                            signature: Some(format!("type {name}")),
                            parent_id: parent_id.clone(),
                            doc_string: None,
                            metadata: Default::default(),
                            config,
                            mutation_path: false,
                        },
                    ));
                }
            }
            "internal_module" | "module" => {
                if let Some(name_node) = actual.child_by_field_name("name") {
                    let name = base.node_text(&name_node);
                    let name_path = BaseExtractor::build_name_path(parent_path, name);
                    let sym = base.create_symbol(
                        &actual,
                        SymbolType::Namespace,
                        name,
                        &name_path,
                        SymbolOptions {
                            signature: Some(format!("namespace {name}")),
                            parent_id: parent_id.clone(),
                            doc_string: None,
                            metadata: Default::default(),
                            config,
                            mutation_path: false,
                        },
                    );
                    let sym_id = sym.id.clone();
                    symbols.push(sym);
                    if let Some(body) = actual.child_by_field_name("body") {
                        walk(body, base, config, &name_path, Some(sym_id), symbols);
                    }
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                extract_variable_declarators(&actual, base, config, parent_path, parent_id.clone(), symbols);
            }
            _ => {}
        }
    }
}

fn extract_class(
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
    let heritage = node
        .child_by_field_name("heritage")
        .map(|n| format!(" {}", base.node_text(&n)))
        .unwrap_or_default();
    let sym = base.create_symbol(
        node,
        SymbolType::Class,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("class {name}{heritage}")),
            parent_id,
            doc_string: None,
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
        if member.kind() == "method_definition" {
            let Some(mname_node) = member.child_by_field_name("name") else { continue };
            let mname = base.node_text(&mname_node);
            let symbol_type = if mname == "constructor" {
                SymbolType::Constructor
            } else {
                SymbolType::Method
            };
            if let Some(sym) = extract_function(&member, base, config, &name_path, Some(sym_id.clone()), symbol_type) {
                symbols.push(sym);
            }
        } else if member.kind() == "field_definition" {
            if let Some(pname_node) = member.child_by_field_name("property") {
                let pname = base.node_text(&pname_node);
                symbols.push(base.create_symbol(
                    &member,
                    SymbolType::Property,
                    pname,
                    &BaseExtractor::build_name_path(&name_path, pname),
                    SymbolOptions {
                        signature: Some(pname.to_string()),
                        parent_id: Some(sym_id.clone()),
                        doc_string: None,
                        metadata: Default::default(),
                        config,
                        mutation_path: false,
                    },
                ));
            }
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
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    let params = node
        .child_by_field_name("parameters")
        .map(|n| base.node_text(&n))
        .unwrap_or("()");
    let return_type = node
        .child_by_field_name("return_type")
        .map(|n| format!(": {}", base.node_text(&n)))
        .unwrap_or_default();
    Some(base.create_symbol(
        node,
        symbol_type,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("{name}{params}{return_type}")),
            parent_id,
            doc_string: base.preceding_comment(node, config).map(|c| super::base::clean_comment_text(&c)),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_interface(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    symbols: &mut Vec<CodeSymbol>,
) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = base.node_text(&name_node);
    symbols.push(base.create_symbol(
        node,
        SymbolType::Interface,
        name,
        &BaseExtractor::build_name_path(parent_path, name),
        SymbolOptions {
            signature: Some(format!("interface {name}")),
            parent_id,
            doc_string: None,
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ));
}

fn extract_enum(
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
    let sym = base.create_symbol(
        node,
        SymbolType::Enum,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("enum {name}")),
            parent_id,
            doc_string: None,
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    );
    let sym_id = sym.id.clone();
    symbols.push(sym);

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            if member.kind() == "enum_assignment" || member.kind() == "property_identifier" {
                let name_node = member.child_by_field_name("name").unwrap_or(member);
                let member_name = base.node_text(&name_node);
                symbols.push(base.create_symbol(
                    &member,
                    SymbolType::EnumMember,
                    member_name,
                    &BaseExtractor::build_name_path(&name_path, member_name),
                    SymbolOptions {
                        signature: Some(member_name.to_string()),
                        parent_id: Some(sym_id.clone()),
                        doc_string: None,
                        metadata: Default::default(),
                        config,
                        mutation_path: false,
                    },
                ));
            }
        }
    }
}

/// A declarator whose initializer is an arrow/function expression is
/// classified `function`; otherwise `variable`, or `constant` for `const`.
fn extract_variable_declarators(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    symbols: &mut Vec<CodeSymbol>,
) {
    let is_const = base.node_text(node).trim_start().starts_with("const");
    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else { continue };
        if name_node.kind() != "identifier" {
            continue;
        }
        let name = base.node_text(&name_node);
        let value = declarator.child_by_field_name("value");
        let is_function_like = value
            .map(|v| matches!(v.kind(), "arrow_function" | "function_expression" | "generator_function"))
            .unwrap_or(false);
        let symbol_type = if is_function_like {
            SymbolType::Function
        } else if is_const {
            SymbolType::Constant
        } else {
            SymbolType::Variable
        };
        symbols.push(base.create_symbol(
            &declarator,
            symbol_type,
            name,
            &BaseExtractor::build_name_path(parent_path, name),
            SymbolOptions {
                signature: Some(base.node_text(&declarator).to_string()),
                parent_id: parent_id.clone(),
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
    fn arrow_const_is_classified_as_function() {
        let src = "export const add = (a,b)=>a+b;";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::TypeScript).unwrap();
        let cfg = Config::default();
        let symbols = JavaScriptExtractor.extract_symbols(&tree, src, "lib.ts", "p", &cfg);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "add");
        assert_eq!(symbols[0].symbol_type, SymbolType::Function);
    }
}
</content>
