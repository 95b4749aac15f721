//! JSON-ready dump of the part of a syntax tree that belongs to one file.

use serde::Serialize;

use crate::diagnostic::make_snippet;
use crate::source::SourceCache;
use crate::syntax::{FileId, SyntaxNode, SyntaxTree};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstDump {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<AstRange>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstDump>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstRange {
    pub file: String,
    pub line: usize,
    pub cols: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Dumps `tree` from its root, dropping every subtree that starts outside
/// `file`.
pub fn dump_tree(tree: &SyntaxTree, file: Option<FileId>, sources: &mut SourceCache) -> AstDump {
    dump_node(tree, tree.node(tree.root()), file, sources)
}

fn dump_node(
    tree: &SyntaxTree,
    node: &SyntaxNode,
    file: Option<FileId>,
    sources: &mut SourceCache,
) -> AstDump {
    let start = node.extent.start;
    let range = start.file.map(|node_file| {
        let path = tree.file_path(node_file);
        let code = sources
            .segment(path, start.offset, node.extent.char_len())
            .ok()
            .map(|text| make_snippet(&text));
        AstRange {
            file: path.display().to_string(),
            line: start.line,
            cols: start.column,
            code,
        }
    });

    let children = tree
        .children(node.id)
        .filter(|child| file.is_some() && child.extent.start.file == file)
        .map(|child| dump_node(tree, child, file, sources))
        .collect();

    AstDump {
        kind: node.kind.as_str().to_string(),
        range,
        type_tag: node.type_tag.clone(),
        children,
    }
}
