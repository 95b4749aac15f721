use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleRegistry};
use crate::source::SourceCache;
use crate::syntax::{CppSyntaxProvider, ParseError, SyntaxProvider, SyntaxTree};
use crate::walker::TreeWalker;

/// Provider that ignores the source text and returns a hand-built tree.
pub struct FixedTree(pub fn(&Path) -> SyntaxTree);

impl SyntaxProvider for FixedTree {
    fn parse(&self, path: &Path, _source: &str) -> Result<SyntaxTree, ParseError> {
        Ok((self.0)(path))
    }
}

pub fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

/// Parses `code` as `test.cpp` and runs `rule` alone over it.
pub fn run_rule(rule: impl Rule + 'static, code: &str) -> Vec<Diagnostic> {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "test.cpp", code);

    let mut registry = RuleRegistry::new();
    registry.register(std::sync::Arc::new(rule));

    let mut walker = TreeWalker::new(CppSyntaxProvider::new(), SourceCache::new());
    walker.reset(&path, &registry).unwrap();
    walker.visit_root();
    walker.finish()
}
