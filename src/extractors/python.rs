//! Python extractor: classes, functions/methods, decorator unwrapping, and
//! docstring extraction.

use super::base::{strip_python_string_quotes, BaseExtractor, SymbolOptions};
use super::LanguageExtractor;
use crate::config::Config;
use crate::registry::Language;
use crate::symbol::{CodeSymbol, SymbolType};
use tree_sitter::{Node, Tree};

pub struct PythonExtractor;

impl LanguageExtractor for PythonExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Python]
    }

    fn extract_symbols(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        project_id: &str,
        config: &Config,
    ) -> Vec<CodeSymbol> {
        let base = BaseExtractor::new("python", file_path, project_id, source);
        let mut symbols = Vec::new();
        walk(tree.root_node(), &base, config, "", None, false, &mut symbols);
        symbols
    }
}

fn walk(
    node: Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    in_class: bool,
    symbols: &mut Vec<CodeSymbol>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let (actual, decorators) = unwrap_decorated(&child);
        match actual.kind() {
            "class_definition" => {
                if let Some(name_node) = actual.child_by_field_name("name") {
                    let name = base.node_text(&name_node);
                    let name_path = BaseExtractor::build_name_path(parent_path, name);
                    let bases = actual
                        .child_by_field_name("superclasses")
                        .map(|n| base.node_text(&n))
                        .unwrap_or("");
                    let sym = base.create_symbol(
                        &actual,
                        SymbolType::Class,
                        name,
                        &name_path,
                        SymbolOptions {
                            signature: Some(format!("class {name}{bases}")),
                            parent_id: parent_id.clone(),
                            doc_string: extract_docstring(&actual, base),
                            metadata: Default::default(),
                            config,
                            mutation_path: false,
                        },
                    );
                    let sym_id = sym.id.clone();
                    symbols.push(sym);
                    if let Some(body) = actual.child_by_field_name("body") {
                        walk(body, base, config, &name_path, Some(sym_id), true, symbols);
                    }
                }
            }
            "function_definition" => {
                let decorator_texts: Vec<String> = decorators.iter().map(|d| base.node_text(d).to_string()).collect();
                if let Some(sym) = extract_function(&actual, base, config, parent_path, parent_id.clone(), in_class, &decorator_texts) {
                    symbols.push(sym);
                }
            }
            "expression_statement" => {
                extract_assignment(&actual, base, config, parent_path, parent_id.clone(), in_class, symbols);
            }
            _ => {}
        }
    }
}

/// Python wraps a decorated def/class in `decorated_definition`; unwraps it
/// and returns the decorator name texts alongside the inner node.
fn unwrap_decorated<'a>(node: &Node<'a>) -> (Node<'a>, Vec<Node<'a>>) {
    if node.kind() != "decorated_definition" {
        return (*node, Vec::new());
    }
    let mut decorators = Vec::new();
    let mut inner = *node;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "decorator" => decorators.push(child),
            "function_definition" | "class_definition" => inner = child,
            _ => {}
        }
    }
    (inner, decorators)
}

fn extract_function(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    in_class: bool,
    decorators: &[String],
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
        .map(|n| format!(" -> {}", base.node_text(&n)))
        .unwrap_or_default();
    let is_property = decorators.iter().any(|d| d.contains("property") || d.contains("cached_property"));
    let symbol_type = if is_property {
        SymbolType::Property
    } else if in_class {
        SymbolType::Method
    } else {
        SymbolType::Function
    };
    Some(base.create_symbol(
        node,
        symbol_type,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(format!("def {name}({}){return_type}", params.trim_start_matches('(').trim_end_matches(')'))),
            parent_id,
            doc_string: extract_docstring(node, base),
            metadata: Default::default(),
            config,
            mutation_path: false,
        },
    ))
}

/// First string-expression statement inside the body.
fn extract_docstring(node: &Node, base: &BaseExtractor) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() == "expression_statement" {
        let expr = first.named_child(0)?;
        if expr.kind() == "string" {
            return Some(strip_python_string_quotes(base.node_text(&expr)));
        }
    }
    None
}

fn extract_assignment(
    node: &Node,
    base: &BaseExtractor,
    config: &Config,
    parent_path: &str,
    parent_id: Option<String>,
    in_class: bool,
    symbols: &mut Vec<CodeSymbol>,
) {
    let Some(assignment) = node.named_child(0) else { return };
    if assignment.kind() != "assignment" {
        return;
    }
    let Some(left) = assignment.child_by_field_name("left") else { return };
    if left.kind() != "identifier" {
        return;
    }
    let name = base.node_text(&left);
    let symbol_type = if in_class {
        SymbolType::Property
    } else if name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_numeric()) && name.len() > 1 {
        SymbolType::Constant
    } else {
        SymbolType::Variable
    };
    let name_path = BaseExtractor::build_name_path(parent_path, name);
    symbols.push(base.create_symbol(
        &assignment,
        symbol_type,
        name,
        &name_path,
        SymbolOptions {
            signature: Some(name.to_string()),
            parent_id,
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
    fn property_decorator_yields_property_symbol() {
        let src = "class Shape:\n    @property\n    def area(self):\n        return 1\n";
        let pool = ParserPool::new();
        let tree = pool.parse(src.as_bytes(), Language::Python).unwrap();
        let cfg = Config::default();
        let symbols = PythonExtractor.extract_symbols(&tree, src, "shape.py", "p", &cfg);
        let area = symbols.iter().find(|s| s.name == "area").unwrap();
        assert_eq!(area.symbol_type, SymbolType::Property);
        assert!(area.parent_id.is_some());
    }
}
</content>
