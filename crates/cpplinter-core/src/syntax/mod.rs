//! Read-only syntax tree handed to the walker by a [`SyntaxProvider`].
//!
//! Nodes live in an arena owned by the tree and are addressed by [`NodeId`].
//! Kinds follow clang's cursor kinds so rules can be written against a
//! single vocabulary regardless of which provider produced the tree.

pub mod cpp;

use std::fmt;
use std::path::{Path, PathBuf};

use id_arena::{Arena, Id};

pub use cpp::CppSyntaxProvider;

pub type NodeId = Id<SyntaxNode>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Not a C/C++ source file: {}", path.display())]
    UnsupportedFile { path: PathBuf },
    #[error("Failed to load C++ grammar: {message}")]
    Language { message: String },
    #[error("Syntax error in '{}' at {line}:{column}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },
    #[error("Parser produced no tree for '{}'", path.display())]
    NoTree { path: PathBuf },
}

/// Turns source text into a [`SyntaxTree`].
pub trait SyntaxProvider {
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree, ParseError>;
}

impl<P: SyntaxProvider + ?Sized> SyntaxProvider for &P {
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree, ParseError> {
        (**self).parse(path, source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub file: Option<FileId>,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
    /// 0-based character offset into the decoded text.
    pub offset: usize,
}

impl Location {
    pub fn new(file: Option<FileId>, line: usize, column: usize, offset: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset,
        }
    }
}

/// Half-open source range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub start: Location,
    pub end: Location,
}

impl Extent {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    pub fn char_len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TranslationUnit,
    FunctionDecl,
    CxxMethod,
    ParmDecl,
    CompoundStmt,
    IntegerLiteral,
    FloatingLiteral,
    VarDecl,
    FieldDecl,
    ClassDecl,
    StructDecl,
    Namespace,
    InclusionDirective,
    IfStmt,
    ForStmt,
    WhileStmt,
    DoStmt,
    SwitchStmt,
    ReturnStmt,
    CallExpr,
    BinaryOperator,
    UnaryOperator,
    ParenExpr,
    StringLiteral,
    CharacterLiteral,
    DeclRefExpr,
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::TranslationUnit => "TRANSLATION_UNIT",
            NodeKind::FunctionDecl => "FUNCTION_DECL",
            NodeKind::CxxMethod => "CXX_METHOD",
            NodeKind::ParmDecl => "PARM_DECL",
            NodeKind::CompoundStmt => "COMPOUND_STMT",
            NodeKind::IntegerLiteral => "INTEGER_LITERAL",
            NodeKind::FloatingLiteral => "FLOATING_LITERAL",
            NodeKind::VarDecl => "VAR_DECL",
            NodeKind::FieldDecl => "FIELD_DECL",
            NodeKind::ClassDecl => "CLASS_DECL",
            NodeKind::StructDecl => "STRUCT_DECL",
            NodeKind::Namespace => "NAMESPACE",
            NodeKind::InclusionDirective => "INCLUSION_DIRECTIVE",
            NodeKind::IfStmt => "IF_STMT",
            NodeKind::ForStmt => "FOR_STMT",
            NodeKind::WhileStmt => "WHILE_STMT",
            NodeKind::DoStmt => "DO_STMT",
            NodeKind::SwitchStmt => "SWITCH_STMT",
            NodeKind::ReturnStmt => "RETURN_STMT",
            NodeKind::CallExpr => "CALL_EXPR",
            NodeKind::BinaryOperator => "BINARY_OPERATOR",
            NodeKind::UnaryOperator => "UNARY_OPERATOR",
            NodeKind::ParenExpr => "PAREN_EXPR",
            NodeKind::StringLiteral => "STRING_LITERAL",
            NodeKind::CharacterLiteral => "CHARACTER_LITERAL",
            NodeKind::DeclRefExpr => "DECL_REF_EXPR",
            NodeKind::Other(name) => name,
        }
    }

    /// Free function or method declaration, with or without a body.
    pub fn is_function_like(&self) -> bool {
        matches!(self, NodeKind::FunctionDecl | NodeKind::CxxMethod)
    }

    pub fn is_numeric_literal(&self) -> bool {
        matches!(self, NodeKind::IntegerLiteral | NodeKind::FloatingLiteral)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub extent: Extent,
    pub children: Vec<NodeId>,
    pub type_tag: Option<String>,
    /// Location of the defining declaration, when the provider knows it.
    pub definition: Option<Location>,
}

impl SyntaxNode {
    pub fn location(&self) -> Location {
        self.extent.start
    }
}

#[derive(Debug)]
pub struct SyntaxTree {
    arena: Arena<SyntaxNode>,
    root: NodeId,
    files: Vec<PathBuf>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns `None` for ids that do not belong to this tree.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.arena.get(id)
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.arena[id]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &SyntaxNode> {
        self.arena[id].children.iter().filter_map(|&c| self.arena.get(c))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn file_path(&self, file: FileId) -> &Path {
        &self.files[file.0 as usize]
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.files
            .iter()
            .position(|p| p == path)
            .map(|i| FileId(i as u32))
    }

    /// Depth-first pre-order over every node reachable from the root.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root],
        }
    }
}

pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.stack.pop()?;
            if let Some(node) = self.tree.get(id) {
                self.stack.extend(node.children.iter().rev());
                return Some(node);
            }
        }
    }
}

/// Incremental construction of a [`SyntaxTree`].
#[derive(Debug, Default)]
pub struct SyntaxTreeBuilder {
    arena: Arena<SyntaxNode>,
    files: Vec<PathBuf>,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_file(&mut self, path: impl AsRef<Path>) -> FileId {
        let path = path.as_ref();
        if let Some(i) = self.files.iter().position(|p| p == path) {
            return FileId(i as u32);
        }
        self.files.push(path.to_path_buf());
        FileId((self.files.len() - 1) as u32)
    }

    pub fn add_node(&mut self, kind: NodeKind, extent: Extent) -> NodeId {
        self.arena.alloc_with_id(|id| SyntaxNode {
            id,
            kind,
            extent,
            children: Vec::new(),
            type_tag: None,
            definition: None,
        })
    }

    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, extent: Extent) -> NodeId {
        let id = self.add_node(kind, extent);
        self.arena[parent].children.push(id);
        id
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.arena[parent].children.push(child);
    }

    pub fn set_type(&mut self, id: NodeId, type_tag: impl Into<String>) {
        self.arena[id].type_tag = Some(type_tag.into());
    }

    pub fn set_definition(&mut self, id: NodeId, definition: Location) {
        self.arena[id].definition = Some(definition);
    }

    pub fn build(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            arena: self.arena,
            root,
            files: self.files,
        }
    }
}
