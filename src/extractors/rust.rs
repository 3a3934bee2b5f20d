//! Rust extractor: a two-phase walk. Symbols are walked first, then `impl`
//! blocks are resolved against the struct/enum/trait they extend so methods
//! get the right `parent_id` and `name_path`.

use super::base::{BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct RustExtractor;

impl LanguageExtractor for RustExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Rust]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("rust", file_path, project_id, source);
        let mut symbols = Vec::new();
        let mut impl_blocks = Vec::new();
        walk(tree.root_node(), &base, config, "", None, &mut symbols, &mut impl_blocks);
        attach_impl_methods(&base, config, &impl_blocks, &mut symbols);
        symbols
    }
}

struct ImplBlock<'a> {
    node: Node<'a>,
    type_name: String,
    name_path: String,
}

fn walk<'a>(
    node: Node<'a>,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    symbols: &mut Vec<CodeSymbol>,
    impl_blocks: &mut Vec<ImplBlock<'a>>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "struct_item" | "enum_item" | "trait_item" | "union_item" => {
                if let Some(sym) = extract_type_decl(&child, base, config, parent_path, parent_id.clone()) {
                    let sym_id = sym.id.clone();
                    let sym_path = sym.name_path.clone();
                    extract_fields_or_variants(&child, base, config, &sym_path, &sym_id, symbols);
                    symbols.push(sym);
                }
            }
            "function_item" => {
                if let Some(sym) = extract_function(&child, base, config, parent_path, parent_id.clone(), false) {
                    symbols.push(sym);
                }
            }
            "const_item" | "static_item" => {
                if let Some(sym) = extract_const_static(&child, base, config, parent_path, parent_id.clone()) {
                    symbols.push(sym);
                }
            }
            "type_item" => {
                if let Some(sym) = extract_type_alias(&child, base, config, parent_path, parent_id.clone()) {
                    symbols.push(sym);
                }
            }
            "mod_item" => {
                if let Some(name) = field_text(&child, "name", base) {
                    let mod_path = BaseExtractor::build_name_path(parent_path, name);
                    let sym = base.create_symbol(
                        &child,
                        SymbolType::Module,
                        name,
                        &mod_path,
                        SymbolOptions {
                            signature: Some(format!("mod {name}")),
                            parent_id: parent_id.clone(),
                            doc_string: preceding_doc(&child, base, config),
                            metadata: Default::default(),
                            config,
                            mutation_path: false,
                        },
                    );
                    let mod_id = sym.id.clone();
                    symbols.push(sym);
                    if let Some(body) = child.child_by_field_name("body") {
                        walk(body, base, config, &mod_path, Some(mod_id), symbols, impl_blocks);
                    }
                }
            }
            "impl_item" => {
                let type_name = child
                    .children(&mut child.walk())
                    .find(|c| c.kind() == "type_identifier")
                    .map(|n| base.node_text(&n).to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                impl_blocks.push(ImplBlock {
                    node: child,
                    type_name,
                    name_path: parent_path.to_string(),
                });
            }
            _ => walk(child, base, config, parent_path, parent_id.clone(), symbols, impl_blocks),
        }
    }
}

fn attach_impl_methods(
    base: &BaseExtractor,
    config: &Config,
    impl_blocks: &[ImplBlock],
    symbols: &mut Vec<CodeSymbol>,
) {
    for block in impl_blocks {
        let target = symbols
            .iter()
            .find(|s| s.name == block.type_name && matches!(s.symbol_type, SymbolType::Struct | SymbolType::Enum | SymbolType::Trait))
            .map(|s| (s.id.clone(), s.name_path.clone()));
        let Some((target_id, target_path)) = target else { continue };

        if let Some(decls) = child_of_kind(&block.node, "declaration_list") {
            for member in decls.children(&mut decls.walk()) {
                if member.kind() == "function_item" {
                    if let Some(mut method) = extract_function(&member, base, config, &target_path, Some(target_id.clone()), true) {
                        method
                            .metadata
                            .insert("impl_type".into(), serde_json::Value::String(block.type_name.clone()));
                        symbols.push(method);
                    }
                }
            }
        }
    }
}

fn extract_type_decl(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
) -> Option<CodeSymbol> {
    let name = field_text(node, "name", base)?;
    let symbol_type = match node.kind() {
        "struct_item" => SymbolType::Struct,
        "enum_item" => SymbolType::Enum,
        "trait_item" => SymbolType::Trait,
        "union_item" => SymbolType::Struct,
        _ => return None,
    };
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    let keyword = match node.kind() {
        "struct_item" => "struct",
        "enum_item" => "enum",
        "trait_item" => "trait",
        "union_item" => "union",
        _ => "",
    };
    Some(base.create_symbol(
        node,
        symbol_type,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("{keyword} {name}")),
            parent_id,
            doc_string: preceding_doc(node, base, config),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_fields_or_variants(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: &str,
    symbols: &mut Vec<CodeSymbol>,
) {
    let body_kind = match node.kind() {
        "struct_item" => "field_declaration_list",
        "enum_item" => "enum_variant_list",
        _ => return,
    };
    let Some(body) = child_of_kind(node, body_kind) else { return };
    let mut cursor = body.walk();
    for member in body.children(&mut cursor) {
        match member.kind() {
            "field_declaration" => {
                if let Some(name) = field_text(&member, "name", base) {
                    let name_path = BaseExtractor::build_name_path(parent_path, name);
                    symbols.push(base.create_symbol(
                        &member,
                        SymbolType::Field,
                        name,
                        &name_path,
                        SymbolOptions {
                            signature: field_text(&member, "type", base).map(|t| format!("{name}: {t}")),
                            parent_id: Some(parent_id.to_string()),
                            doc_string: None,
                            metadata: Default::default(),
                            config,
                            mutation_path: false,
                        },
                    ));
                }
            }
            "enum_variant" => {
                if let Some(name) = field_text(&member, "name", base) {
                    let name_path = BaseExtractor::build_name_path(parent_path, name);
                    symbols.push(base.create_symbol(
                        &member,
                        SymbolType::EnumMember,
                        name,
                        &name_path,
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
    is_method: bool,
) -> Option<CodeSymbol> {
    let name = field_text(node, "name", base)?;
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    let params = field_text(node, "parameters", base).unwrap_or("()");
    let return_type = node
        .child_by_field_name("return_type")
        .map(|n| format!(" -> {}", base.node_text(&n)));
    let signature = format!("fn {name}{params}{}", return_type.unwrap_or_default());
    Some(base.create_symbol(
        node,
        if is_method { SymbolType::Method } else { SymbolType::Function },
        name,
        &name_path,
        SymbolOptions {
            signature: Some(signature),
            parent_id,
            doc_string: preceding_doc(node, base, config),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_const_static(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
) -> Option<CodeSymbol> {
    let name = field_text(node, "name", base)?;
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    Some(base.create_symbol(
        node,
        SymbolType::Constant,
        name,
        &name_path,
        SymbolOptions {
            signature: field_text(node, "type", base).map(|t| format!("{name}: {t}")),
            parent_id,
            doc_string: preceding_doc(node, base, config),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn extract_type_alias(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
) -> Option<CodeSymbol> {
    let name = field_text(node, "name", base)?;
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    Some(base.create_symbol(
        node,
        SymbolType::TypeAlias,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("type {name}")),
            parent_id,
            doc_string: preceding_doc(node, base, config),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

fn field_text<'s>(node: &Node, field: &str, base: &BaseExtractor<'s>) -> Option<&'s str> {
    node.child_by_field_name(field).map(|n| base.node_text(&n))
}

fn child_of_kind<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn preceding_doc(node: &Node, base: &BaseExtractor, config: &Config) -> Option<String> {
    base.preceding_comment(node, config)
        .map(|raw| super::base::clean_comment_text(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::ParserPool;

    #[test]
    fn impl_method_gets_impl_type_metadata_and_name_path() {
        let src = "pub struct S;\nimpl S { pub fn go(&self) {} }\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Rust).unwrap();
        let extractor = RustExtractor;
        let cfg = Config::default();
        let symbols = extractor.extract_symbols(&tree, src, "src/a.rs", "p", &cfg);

        let s = symbols.iter().find(|s| s.name_path == "/S").unwrap();
        assert_eq!(s.symbol_type, SymbolType::Struct);

        let method = symbols.iter().find(|s| s.name_path == "/S/go").unwrap();
        assert_eq!(method.symbol_type, SymbolType::Method);
        assert_eq!(
            method.metadata.get("impl_type").and_then(|v| v.as_str()),
            Some("S")
        );
    }
}
</content>
