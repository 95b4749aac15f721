//! C/C++ syntax provider backed by tree-sitter.
//!
//! tree-sitter produces a concrete syntax tree; this module lowers it into the
//! clang-shaped tree the rules are written against: declarators are folded
//! into their declarations, parameters become direct children of the function,
//! expression statements disappear and literals hang directly off the
//! declaration they initialize.

use std::path::Path;

use tree_sitter::{Node, Parser, Point};

use super::{
    Extent, FileId, Location, NodeId, NodeKind, ParseError, SyntaxProvider, SyntaxTree,
    SyntaxTreeBuilder,
};
use crate::discovery::is_source_file;

#[derive(Debug, Clone, Default)]
pub struct CppSyntaxProvider {
    strict_syntax: bool,
}

impl CppSyntaxProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every tree containing `ERROR`/`MISSING` nodes, not only the
    /// ones nothing could be recovered from.
    pub fn strict_syntax(mut self, enabled: bool) -> Self {
        self.strict_syntax = enabled;
        self
    }
}

impl SyntaxProvider for CppSyntaxProvider {
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree, ParseError> {
        if !is_source_file(path) {
            return Err(ParseError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| ParseError::Language {
                message: e.to_string(),
            })?;

        let tree = parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            path: path.to_path_buf(),
        })?;
        let root = tree.root_node();

        if root.has_error() && (self.strict_syntax || !is_recoverable(root)) {
            let point = first_error(root).map(|n| n.start_position()).unwrap_or_default();
            return Err(ParseError::Syntax {
                path: path.to_path_buf(),
                line: point.row + 1,
                column: point.column + 1,
            });
        }

        Ok(Lowering::new(path, source).run(root))
    }
}

/// Unknown macros such as `DLL_EXPORT` or `Q_OBJECT` leave error nodes inside
/// otherwise sound declarations. The tree is still worth checking as long as
/// at least one top-level item parsed.
fn is_recoverable(root: Node<'_>) -> bool {
    if root.is_error() {
        return false;
    }
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .any(|c| !c.is_error() && !c.is_missing() && !c.is_extra())
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}

/// Maps byte offsets to character offsets.
struct OffsetMap {
    char_starts: Option<Vec<usize>>,
}

impl OffsetMap {
    fn new(source: &str) -> Self {
        let char_starts = if source.is_ascii() {
            None
        } else {
            Some(source.char_indices().map(|(i, _)| i).collect())
        };
        Self { char_starts }
    }

    fn char_offset(&self, byte: usize) -> usize {
        match &self.char_starts {
            None => byte,
            Some(starts) => starts.partition_point(|&b| b < byte),
        }
    }
}

struct Lowering<'s> {
    bytes: &'s [u8],
    offsets: OffsetMap,
    builder: SyntaxTreeBuilder,
    file: FileId,
}

impl<'s> Lowering<'s> {
    fn new(path: &Path, source: &'s str) -> Self {
        let mut builder = SyntaxTreeBuilder::new();
        let file = builder.intern_file(path);
        Self {
            bytes: source.as_bytes(),
            offsets: OffsetMap::new(source),
            builder,
            file,
        }
    }

    fn run(mut self, root: Node<'_>) -> SyntaxTree {
        let extent = self.extent(root);
        let unit = self.builder.add_node(NodeKind::TranslationUnit, extent);
        self.lower_children(root, unit);
        self.builder.build(unit)
    }

    fn location(&self, byte: usize, point: Point) -> Location {
        let line_start = byte.saturating_sub(point.column);
        let offset = self.offsets.char_offset(byte);
        let column = offset - self.offsets.char_offset(line_start) + 1;
        Location::new(Some(self.file), point.row + 1, column, offset)
    }

    fn extent(&self, node: Node<'_>) -> Extent {
        self.extent_between(node, node)
    }

    fn extent_between(&self, first: Node<'_>, last: Node<'_>) -> Extent {
        Extent::new(
            self.location(first.start_byte(), first.start_position()),
            self.location(last.end_byte(), last.end_position()),
        )
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.bytes).unwrap_or("")
    }

    fn lower_children(&mut self, node: Node<'_>, parent: NodeId) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            self.lower(child, parent);
        }
    }

    fn lower(&mut self, node: Node<'_>, parent: NodeId) {
        match node.kind() {
            "comment" | "access_specifier" | "primitive_type" | "sized_type_specifier"
            | "type_qualifier" | "storage_class_specifier" => {}
            "expression_statement" | "declaration_list" | "field_declaration_list"
            | "condition_clause" | "argument_list" => self.lower_children(node, parent),
            "preproc_if" | "preproc_ifdef" | "preproc_elif" | "preproc_else" | "preproc_elifdef" => {
                self.lower_conditional_block(node, parent)
            }
            "preproc_include" => {
                let extent = self.extent(node);
                self.builder
                    .add_child(parent, NodeKind::InclusionDirective, extent);
            }
            "preproc_def" | "preproc_function_def" => {
                let extent = self.extent(node);
                self.builder.add_child(
                    parent,
                    NodeKind::Other("MACRO_DEFINITION".to_string()),
                    extent,
                );
            }
            "function_definition" => self.lower_function_definition(node, parent),
            "declaration" | "field_declaration" => self.lower_declaration(node, parent),
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                self.lower_record(node, parent)
            }
            "namespace_definition" => {
                let extent = self.extent(node);
                let id = self.builder.add_child(parent, NodeKind::Namespace, extent);
                if let Some(body) = node.child_by_field_name("body") {
                    self.lower_children(body, id);
                }
            }
            "number_literal" => self.lower_number(node, parent),
            kind => {
                let extent = self.extent(node);
                let id = self.builder.add_child(parent, map_kind(kind), extent);
                self.lower_children(node, id);
            }
        }
    }

    fn lower_conditional_block(&mut self, node: Node<'_>, parent: NodeId) {
        let mut cursor = node.walk();
        let mut items = Vec::new();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                let is_condition = matches!(cursor.field_name(), Some("name" | "condition"));
                if child.is_named() && !is_condition {
                    items.push(child);
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        for item in items {
            self.lower(item, parent);
        }
    }

    fn lower_record(&mut self, node: Node<'_>, parent: NodeId) {
        // A bare `struct Foo` used as a type is not a declaration of its own.
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let kind = match node.kind() {
            "class_specifier" => NodeKind::ClassDecl,
            "struct_specifier" => NodeKind::StructDecl,
            _ => NodeKind::Other("UNION_DECL".to_string()),
        };
        let extent = self.extent(node);
        let id = self.builder.add_child(parent, kind, extent);
        self.lower_children(body, id);
    }

    fn lower_number(&mut self, node: Node<'_>, parent: NodeId) {
        let text = self.text(node);
        let (kind, type_tag) = if is_floating_text(text) {
            let lower = text.to_ascii_lowercase();
            let is_float = lower.ends_with('f') && !lower.starts_with("0x");
            (
                NodeKind::FloatingLiteral,
                if is_float { "float" } else { "double" },
            )
        } else {
            (NodeKind::IntegerLiteral, "int")
        };
        let extent = self.extent(node);
        let id = self.builder.add_child(parent, kind, extent);
        self.builder.set_type(id, type_tag);
    }

    fn lower_function_definition(&mut self, node: Node<'_>, parent: NodeId) {
        let Some(declarator) = node
            .child_by_field_name("declarator")
            .and_then(find_function_declarator)
        else {
            let extent = self.extent(node);
            let id = self
                .builder
                .add_child(parent, map_kind(node.kind()), extent);
            self.lower_children(node, id);
            return;
        };

        let kind = function_kind(node, declarator);
        let extent = self.extent(node);
        let id = self.builder.add_child(parent, kind, extent);
        self.builder.set_definition(id, extent.start);
        if let Some(ty) = node.child_by_field_name("type") {
            let ty = self.text(ty).to_string();
            self.builder.set_type(id, ty);
        }

        self.lower_parameters(declarator, id);

        let mut cursor = node.walk();
        let initializers: Vec<Node<'_>> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "field_initializer_list")
            .collect();
        for list in initializers {
            self.lower(list, id);
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.lower(body, id);
        }
    }

    fn lower_parameters(&mut self, declarator: Node<'_>, function: NodeId) {
        let Some(list) = declarator.child_by_field_name("parameters") else {
            return;
        };
        let mut cursor = list.walk();
        let params: Vec<Node<'_>> = list
            .named_children(&mut cursor)
            .filter(|p| {
                matches!(
                    p.kind(),
                    "parameter_declaration"
                        | "optional_parameter_declaration"
                        | "variadic_parameter_declaration"
                )
            })
            .collect();

        // `f(void)` declares no parameters.
        if let [only] = params.as_slice() {
            let is_void = only.child_by_field_name("declarator").is_none()
                && only
                    .child_by_field_name("type")
                    .is_some_and(|t| self.text(t) == "void");
            if is_void {
                return;
            }
        }

        for param in params {
            let extent = self.extent(param);
            let id = self
                .builder
                .add_child(function, NodeKind::ParmDecl, extent);
            if let Some(ty) = param.child_by_field_name("type") {
                let ty = self.text(ty).to_string();
                self.builder.set_type(id, ty);
            }
            if let Some(default) = param.child_by_field_name("default_value") {
                self.lower(default, id);
            }
        }
    }

    fn lower_declaration(&mut self, node: Node<'_>, parent: NodeId) {
        let type_node = node.child_by_field_name("type");
        if let Some(ty) = type_node {
            if matches!(
                ty.kind(),
                "class_specifier" | "struct_specifier" | "union_specifier"
            ) {
                self.lower(ty, parent);
            }
        }
        let type_text = type_node.map(|t| self.text(t).to_string());
        // Static data members are variables, not fields.
        let is_field = node.kind() == "field_declaration" && !self.is_static(node);

        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        let mut last_var = None;
        for declarator in declarators {
            if let Some(function) = find_function_declarator(declarator) {
                let kind = function_kind(node, function);
                let extent = self.extent_between(node, declarator);
                let id = self.builder.add_child(parent, kind, extent);
                if let Some(ty) = &type_text {
                    self.builder.set_type(id, ty.clone());
                }
                self.lower_parameters(function, id);
                continue;
            }

            let kind = if is_field {
                NodeKind::FieldDecl
            } else {
                NodeKind::VarDecl
            };
            let extent = self.extent_between(node, declarator);
            let id = self.builder.add_child(parent, kind, extent);
            if let Some(ty) = &type_text {
                self.builder.set_type(id, ty.clone());
            }

            if declarator.kind() == "init_declarator" {
                if let Some(value) = declarator.child_by_field_name("value") {
                    self.lower(value, id);
                }
            }
            last_var = Some(id);
        }

        if let (Some(id), Some(default)) = (last_var, node.child_by_field_name("default_value")) {
            self.lower(default, id);
        }
    }

    fn is_static(&self, node: Node<'_>) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|c| c.kind() == "storage_class_specifier" && self.text(c) == "static")
    }
}

/// Unwraps pointer and reference declarators down to a function declarator.
fn find_function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_declarator" => Some(node),
        "pointer_declarator" | "reference_declarator" => {
            let mut cursor = node.walk();
            let inner = node
                .child_by_field_name("declarator")
                .or_else(|| node.named_children(&mut cursor).last())?;
            find_function_declarator(inner)
        }
        _ => None,
    }
}

fn function_kind(owner: Node<'_>, declarator: Node<'_>) -> NodeKind {
    let qualified = declarator
        .child_by_field_name("declarator")
        .is_some_and(|name| {
            matches!(
                name.kind(),
                "qualified_identifier" | "field_identifier" | "destructor_name"
            )
        });
    if qualified || is_inside_class_body(owner) {
        NodeKind::CxxMethod
    } else {
        NodeKind::FunctionDecl
    }
}

fn is_inside_class_body(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "field_declaration_list" => return true,
            "compound_statement" | "translation_unit" => return false,
            _ => current = parent.parent(),
        }
    }
    false
}

fn is_floating_text(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") {
        lower.contains('p')
    } else {
        lower.contains('.') || lower.contains('e')
    }
}

fn map_kind(kind: &str) -> NodeKind {
    match kind {
        "compound_statement" => NodeKind::CompoundStmt,
        "if_statement" => NodeKind::IfStmt,
        "for_statement" | "for_range_loop" => NodeKind::ForStmt,
        "while_statement" => NodeKind::WhileStmt,
        "do_statement" => NodeKind::DoStmt,
        "switch_statement" => NodeKind::SwitchStmt,
        "return_statement" => NodeKind::ReturnStmt,
        "call_expression" => NodeKind::CallExpr,
        "binary_expression" | "assignment_expression" => NodeKind::BinaryOperator,
        "unary_expression" | "update_expression" | "pointer_expression" => {
            NodeKind::UnaryOperator
        }
        "parenthesized_expression" => NodeKind::ParenExpr,
        "string_literal" | "raw_string_literal" | "concatenated_string" => {
            NodeKind::StringLiteral
        }
        "char_literal" => NodeKind::CharacterLiteral,
        "identifier" => NodeKind::DeclRefExpr,
        other => NodeKind::Other(other.to_ascii_uppercase()),
    }
}
