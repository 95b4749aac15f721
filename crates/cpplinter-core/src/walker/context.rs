//! What a rule sees while the walker is inside a file.

use std::collections::HashMap;
use std::path::Path;

use tracing::trace;

use crate::diagnostic::{Diagnostic, DiagnosticSink, make_snippet};
use crate::rules::Severity;
use crate::source::{SourceCache, SourceError};
use crate::syntax::{FileId, NodeId, SyntaxNode, SyntaxTree};

pub struct RuleContext<'a> {
    pub(super) tree: &'a SyntaxTree,
    pub(super) path: &'a Path,
    pub(super) file: Option<FileId>,
    pub(super) ancestors: &'a mut Vec<NodeId>,
    pub(super) sources: &'a mut SourceCache,
    pub(super) sink: &'a mut DiagnosticSink,
    pub(super) severities: &'a HashMap<String, Severity>,
}

impl<'a> RuleContext<'a> {
    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// Path of the file under analysis.
    pub fn file(&self) -> &Path {
        self.path
    }

    /// Enclosing nodes from the root down to the parent of the current node.
    pub fn ancestors(&self) -> &[NodeId] {
        self.ancestors
    }

    pub fn parent(&self) -> Option<&'a SyntaxNode> {
        self.ancestors.last().and_then(|&id| self.tree.get(id))
    }

    /// Whether `node` starts in the file under analysis.
    pub fn in_file(&self, node: &SyntaxNode) -> bool {
        match (node.extent.start.file, self.file) {
            (Some(node_file), Some(file)) => node_file == file,
            _ => false,
        }
    }

    /// Exact source text covered by `node`'s extent.
    pub fn source_text(&mut self, node: &SyntaxNode) -> Result<String, SourceError> {
        let path = match node.extent.start.file {
            Some(file) => self.tree.file_path(file),
            None => self.path,
        };
        self.sources
            .segment(path, node.extent.start.offset, node.extent.char_len())
    }

    /// Records a finding on `node`. A snippet that cannot be recovered is
    /// left out; the diagnostic is kept.
    pub fn report(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        message: impl Into<String>,
        node: &SyntaxNode,
    ) {
        let severity = self
            .severities
            .get(rule_id)
            .copied()
            .unwrap_or(Severity::Warning);
        let mut diagnostic =
            Diagnostic::new(rule_id, rule_name, message, node.kind.as_str(), severity);

        let start = node.extent.start;
        if let Some(file) = start.file {
            let file_path = self.tree.file_path(file).display().to_string();
            diagnostic = diagnostic.with_location(file_path, start.line, start.column);
        }

        match self.source_text(node) {
            Ok(text) => diagnostic = diagnostic.with_snippet(make_snippet(&text)),
            Err(err) => trace!(rule = rule_id, error = %err, "snippet unavailable"),
        }

        self.sink.push(diagnostic);
    }
}
