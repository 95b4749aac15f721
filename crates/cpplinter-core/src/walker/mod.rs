//! Single-file traversal and rule dispatch.
//!
//! A [`TreeWalker`] moves through three states: `Idle` until a file has been
//! parsed by [`TreeWalker::reset`], `Ready` while a tree is loaded, and
//! `Visiting` for the duration of a descent. Nodes whose start location lies
//! in another file (headers, macro expansions attributed elsewhere) are
//! skipped together with their descendants.

mod context;

pub use context::RuleContext;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, debug_span, trace};

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::rules::{Rule, RuleRegistry, Severity};
use crate::source::{SourceCache, SourceError};
use crate::syntax::{
    CppSyntaxProvider, FileId, NodeId, ParseError, SyntaxProvider, SyntaxTree,
};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalysisError {
    /// True when the file was read but no usable tree could be built.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, AnalysisError::Parse(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Idle,
    Ready,
    Visiting,
}

struct Session {
    path: PathBuf,
    file: Option<FileId>,
    tree: SyntaxTree,
    rules: Vec<Arc<dyn Rule>>,
    severities: HashMap<String, Severity>,
    ancestors: Vec<NodeId>,
    sink: DiagnosticSink,
}

pub struct TreeWalker<P = CppSyntaxProvider> {
    provider: P,
    sources: SourceCache,
    state: WalkState,
    session: Option<Session>,
}

impl<P: SyntaxProvider> TreeWalker<P> {
    pub fn new(provider: P, sources: SourceCache) -> Self {
        Self {
            provider,
            sources,
            state: WalkState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn sources(&self) -> &SourceCache {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceCache {
        &mut self.sources
    }

    /// Tree of the loaded file, if any.
    pub fn tree(&self) -> Option<&SyntaxTree> {
        self.session.as_ref().map(|s| &s.tree)
    }

    /// Decodes `path` through the cache and hands the text to the provider.
    pub fn parse(&mut self, path: &Path) -> Result<SyntaxTree, AnalysisError> {
        let source = self.sources.text(path)?;
        let tree = self.provider.parse(path, source.text())?;
        Ok(tree)
    }

    /// Loads `path` and snapshots the enabled rules of `registry`. On failure
    /// the walker is left `Idle`.
    pub fn reset(&mut self, path: &Path, registry: &RuleRegistry) -> Result<(), AnalysisError> {
        self.state = WalkState::Idle;
        self.session = None;

        let tree = self.parse(path)?;
        let file = tree.file_id(path);
        if file.is_none() {
            debug!(path = %path.display(), "tree does not reference the analyzed file");
        }

        let rules = registry.enabled_rules();
        let severities = rules
            .iter()
            .map(|rule| {
                (
                    rule.metadata().id.to_string(),
                    registry.effective_severity(rule.as_ref()),
                )
            })
            .collect();

        self.session = Some(Session {
            path: path.to_path_buf(),
            file,
            tree,
            rules,
            severities,
            ancestors: Vec::new(),
            sink: DiagnosticSink::new(),
        });
        self.state = WalkState::Ready;
        Ok(())
    }

    /// Visits `id` and its descendants in pre-order. Does nothing while
    /// `Idle`; ids that resolve to no node are skipped.
    pub fn visit(&mut self, id: NodeId) {
        if self.state == WalkState::Idle {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let _span = debug_span!("walk", file = %session.path.display()).entered();
        self.state = WalkState::Visiting;

        let Session {
            path,
            file,
            tree,
            rules,
            severities,
            ancestors,
            sink,
        } = session;
        let mut ctx = RuleContext {
            tree,
            path: path.as_path(),
            file: *file,
            ancestors,
            sources: &mut self.sources,
            sink,
            severities,
        };
        let visited = descend(&mut ctx, rules, id);
        trace!(visited, reported = ctx.sink.len(), "walk finished");

        self.state = WalkState::Ready;
    }

    pub fn visit_root(&mut self) {
        if let Some(root) = self.session.as_ref().map(|s| s.tree.root()) {
            self.visit(root);
        }
    }

    /// Hands over everything reported since the last reset and returns to
    /// `Idle`.
    pub fn finish(&mut self) -> Vec<Diagnostic> {
        self.state = WalkState::Idle;
        self.session
            .take()
            .map(|s| s.sink.into_vec())
            .unwrap_or_default()
    }
}

fn descend(ctx: &mut RuleContext<'_>, rules: &[Arc<dyn Rule>], id: NodeId) -> usize {
    let tree = ctx.tree;
    let Some(node) = tree.get(id) else {
        return 0;
    };
    if !ctx.in_file(node) {
        return 0;
    }

    for rule in rules {
        rule.inspect(ctx, node);
    }

    ctx.ancestors.push(id);
    let mut visited = 1;
    for &child in &node.children {
        visited += descend(ctx, rules, child);
    }
    ctx.ancestors.pop();
    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleMetadata;
    use crate::syntax::{Extent, Location, NodeKind, SyntaxNode, SyntaxTreeBuilder};
    use crate::test_support::{FixedTree, write_source};
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records the kind of every node it is shown together with the depth
    /// of the ancestor stack at that moment.
    struct Recorder {
        metadata: RuleMetadata,
        seen: Arc<Mutex<Vec<(String, usize)>>>,
    }

    impl Recorder {
        fn new() -> (Arc<Self>, Arc<Mutex<Vec<(String, usize)>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let rule = Arc::new(Self {
                metadata: RuleMetadata {
                    id: "REC",
                    name: "recorder",
                    description: "records visits",
                    severity: Severity::Info,
                    examples: None,
                },
                seen: Arc::clone(&seen),
            });
            (rule, seen)
        }
    }

    impl Rule for Recorder {
        fn metadata(&self) -> &RuleMetadata {
            &self.metadata
        }

        fn inspect(&self, ctx: &mut RuleContext<'_>, node: &SyntaxNode) {
            self.seen
                .lock()
                .unwrap()
                .push((node.kind.to_string(), ctx.ancestors().len()));
        }
    }

    /// Reports every variable declaration.
    struct ReportVars {
        metadata: RuleMetadata,
    }

    impl Rule for ReportVars {
        fn metadata(&self) -> &RuleMetadata {
            &self.metadata
        }

        fn inspect(&self, ctx: &mut RuleContext<'_>, node: &SyntaxNode) {
            if node.kind == NodeKind::VarDecl {
                ctx.report("VARS", "report_vars", "variable found", node);
            }
        }
    }

    fn at(file: FileId, line: usize, offset: usize, len: usize) -> Extent {
        Extent::new(
            Location::new(Some(file), line, 1, offset),
            Location::new(Some(file), line, 1 + len, offset + len),
        )
    }

    /// main.cpp: a function with one parameter, a node that belongs to an
    /// included header (with a child of its own), and a trailing variable.
    fn tree_with_header(path: &Path) -> SyntaxTree {
        let mut builder = SyntaxTreeBuilder::new();
        let main = builder.intern_file(path);
        let header = builder.intern_file("include/util.h");

        let root = builder.add_node(NodeKind::TranslationUnit, at(main, 1, 0, 40));
        let func = builder.add_child(root, NodeKind::FunctionDecl, at(main, 1, 0, 20));
        builder.add_child(func, NodeKind::ParmDecl, at(main, 1, 7, 5));
        let foreign = builder.add_child(root, NodeKind::FunctionDecl, at(header, 3, 0, 10));
        builder.add_child(foreign, NodeKind::CompoundStmt, at(main, 1, 0, 2));
        builder.add_child(root, NodeKind::VarDecl, at(main, 2, 17, 10));
        builder.build(root)
    }

    fn recorder_registry() -> (RuleRegistry, Arc<Mutex<Vec<(String, usize)>>>) {
        let (rule, seen) = Recorder::new();
        let mut registry = RuleRegistry::new();
        registry.register(rule);
        (registry, seen)
    }

    #[test]
    fn starts_idle_and_visit_is_noop() {
        let mut builder = SyntaxTreeBuilder::new();
        let root = builder.add_node(NodeKind::TranslationUnit, Extent::default());
        let stray = builder.build(root).root();

        let mut walker = TreeWalker::new(CppSyntaxProvider::new(), SourceCache::new());
        walker.visit(stray);

        assert_eq!(walker.state(), WalkState::Idle);
        assert!(walker.finish().is_empty());
    }

    #[test]
    fn visits_in_preorder_and_skips_foreign_files() {
        let dir = tempdir().unwrap();
        let path = write_source(dir.path(), "main.cpp", "void f(int a) {}\nint counter = 0;\n");
        let (registry, seen) = recorder_registry();

        let mut walker = TreeWalker::new(FixedTree(tree_with_header), SourceCache::new());
        walker.reset(&path, &registry).unwrap();
        assert_eq!(walker.state(), WalkState::Ready);
        walker.visit_root();
        assert_eq!(walker.state(), WalkState::Ready);

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("TRANSLATION_UNIT".to_string(), 0),
                ("FUNCTION_DECL".to_string(), 1),
                ("PARM_DECL".to_string(), 2),
                ("VAR_DECL".to_string(), 1),
            ]
        );
    }

    #[test]
    fn dangling_child_does_not_affect_siblings() {
        let dir = tempdir().unwrap();
        let path = write_source(dir.path(), "main.cpp", "int a = 1;\nint b = 2;\n");

        fn build(path: &Path) -> SyntaxTree {
            let mut other = SyntaxTreeBuilder::new();
            for _ in 0..8 {
                other.add_node(NodeKind::VarDecl, Extent::default());
            }
            let dangling = other.add_node(NodeKind::VarDecl, Extent::default());

            let mut builder = SyntaxTreeBuilder::new();
            let file = builder.intern_file(path);
            let root = builder.add_node(NodeKind::TranslationUnit, at(file, 1, 0, 20));
            builder.add_child(root, NodeKind::VarDecl, at(file, 1, 0, 10));
            builder.attach(root, dangling);
            builder.add_child(root, NodeKind::VarDecl, at(file, 2, 11, 10));
            builder.build(root)
        }

        let (registry, seen) = recorder_registry();
        let mut walker = TreeWalker::new(FixedTree(build), SourceCache::new());
        walker.reset(&path, &registry).unwrap();
        walker.visit_root();

        let kinds: Vec<String> = seen.lock().unwrap().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(kinds, vec!["TRANSLATION_UNIT", "VAR_DECL", "VAR_DECL"]);
    }

    #[test]
    fn report_resolves_location_and_snippet() {
        let dir = tempdir().unwrap();
        let path = write_source(dir.path(), "main.cpp", "void f(int a) {}\nint counter = 0;\n");
        let mut registry = RuleRegistry::new();
        registry.register(Arc::new(ReportVars {
            metadata: RuleMetadata {
                id: "VARS",
                name: "report_vars",
                description: "reports variables",
                severity: Severity::Error,
                examples: None,
            },
        }));

        let mut walker = TreeWalker::new(FixedTree(tree_with_header), SourceCache::new());
        walker.reset(&path, &registry).unwrap();
        walker.visit_root();
        let diagnostics = walker.finish();

        assert_eq!(walker.state(), WalkState::Idle);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.ast_kind, "VAR_DECL");
        assert_eq!(diagnostic.line, Some(2));
        assert_eq!(diagnostic.snippet.as_deref(), Some("int counte"));
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.file, Some(path.display().to_string()));
    }

    #[test]
    fn out_of_range_snippet_is_omitted() {
        let dir = tempdir().unwrap();
        let path = write_source(dir.path(), "main.cpp", "int a;\n");

        fn build(path: &Path) -> SyntaxTree {
            let mut builder = SyntaxTreeBuilder::new();
            let file = builder.intern_file(path);
            let root = builder.add_node(NodeKind::TranslationUnit, at(file, 1, 0, 7));
            builder.add_child(root, NodeKind::VarDecl, at(file, 9, 500, 4));
            builder.build(root)
        }

        let mut registry = RuleRegistry::new();
        registry.register(Arc::new(ReportVars {
            metadata: RuleMetadata {
                id: "VARS",
                name: "report_vars",
                description: "reports variables",
                severity: Severity::Warning,
                examples: None,
            },
        }));

        let mut walker = TreeWalker::new(FixedTree(build), SourceCache::new());
        walker.reset(&path, &registry).unwrap();
        walker.visit_root();
        let diagnostics = walker.finish();

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].snippet.is_none());
        assert_eq!(diagnostics[0].line, Some(9));
    }

    #[test]
    fn failed_reset_leaves_walker_idle() {
        let dir = tempdir().unwrap();
        let good = write_source(dir.path(), "ok.cpp", "int a;\n");
        let (registry, _) = recorder_registry();

        let mut walker = TreeWalker::new(CppSyntaxProvider::new(), SourceCache::new());
        walker.reset(&good, &registry).unwrap();
        assert_eq!(walker.state(), WalkState::Ready);

        let err = walker
            .reset(&dir.path().join("missing.cpp"), &registry)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Source(SourceError::NotFound { .. })));
        assert!(!err.is_parse_failure());
        assert_eq!(walker.state(), WalkState::Idle);
        assert!(walker.tree().is_none());
    }

    #[test]
    fn syntax_error_is_a_parse_failure() {
        let dir = tempdir().unwrap();
        let broken = write_source(dir.path(), "broken.cpp", "}}\n))\n");
        let (registry, _) = recorder_registry();

        let mut walker = TreeWalker::new(CppSyntaxProvider::new(), SourceCache::new());
        let err = walker.reset(&broken, &registry).unwrap_err();

        assert!(err.is_parse_failure());
        assert_eq!(walker.state(), WalkState::Idle);
    }

    #[test]
    fn disabled_rules_are_not_dispatched() {
        let dir = tempdir().unwrap();
        let path = write_source(dir.path(), "main.cpp", "int a;\n");
        let (mut registry, seen) = recorder_registry();
        registry.configure(&crate::config::RulesConfig {
            disabled: vec!["recorder".to_string()],
            ..Default::default()
        });

        let mut walker = TreeWalker::new(CppSyntaxProvider::new(), SourceCache::new());
        walker.reset(&path, &registry).unwrap();
        walker.visit_root();

        assert!(seen.lock().unwrap().is_empty());
    }
}
