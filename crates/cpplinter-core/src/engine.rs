//! Runs the rule set over single files or whole source trees.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::discovery::discover_files_excluding;
use crate::dump::{AstDump, dump_tree};
use crate::rules::RuleRegistry;
use crate::source::SourceCache;
use crate::syntax::{CppSyntaxProvider, SyntaxProvider};
use crate::walker::{AnalysisError, TreeWalker};

/// A file `check_tree` had to skip.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
    pub parse_failure: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Findings of every file that could be checked, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
    pub files_checked: usize,
    /// Files that were checked successfully, in discovery order.
    pub passed: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl CheckReport {
    pub fn files_passed(&self) -> usize {
        self.files_checked - self.failures.len()
    }

    /// Share of files that could be checked, as a percentage truncated to
    /// two decimals.
    pub fn pass_rate(&self) -> f64 {
        let passed = self.files_passed();
        if passed == 0 {
            return 0.0;
        }
        (10_000.0 * passed as f64 / self.files_checked as f64).trunc() / 100.0
    }
}

pub struct LintEngine<P: SyntaxProvider = CppSyntaxProvider> {
    walker: TreeWalker<P>,
    registry: RuleRegistry,
    exclude: Vec<String>,
}

impl LintEngine {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let provider = CppSyntaxProvider::new().strict_syntax(config.parser.strict_syntax);
        let registry = RuleRegistry::with_builtin_rules(&config.rules);
        let mut engine = Self::with_provider(provider, registry, config.cache.capacity);
        engine.exclude = config.exclude.clone();
        engine
    }
}

impl Default for LintEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SyntaxProvider> LintEngine<P> {
    pub fn with_provider(provider: P, registry: RuleRegistry, cache_capacity: usize) -> Self {
        Self {
            walker: TreeWalker::new(provider, SourceCache::with_capacity(cache_capacity)),
            registry,
            exclude: Vec::new(),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn sources(&self) -> &SourceCache {
        self.walker.sources()
    }

    /// Runs every enabled rule over `path`.
    pub fn check_file(&mut self, path: &Path) -> Result<Vec<Diagnostic>, AnalysisError> {
        self.walker.reset(path, &self.registry)?;
        self.walker.visit_root();
        let diagnostics = self.walker.finish();
        debug!(path = %path.display(), count = diagnostics.len(), "checked file");
        Ok(diagnostics)
    }

    /// Checks every source file under `root`. A file that cannot be read or
    /// parsed is recorded as a failure and skipped.
    pub fn check_tree(&mut self, root: &Path) -> CheckReport {
        let files = discover_files_excluding(root, &self.exclude);
        info!(root = %root.display(), files = files.len(), "checking source tree");

        let mut report = CheckReport {
            files_checked: files.len(),
            ..Default::default()
        };

        for path in files {
            match self.check_file(&path) {
                Ok(diagnostics) => {
                    report.diagnostics.extend(diagnostics);
                    report.passed.push(path);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping file");
                    report.failures.push(FileFailure {
                        parse_failure: err.is_parse_failure(),
                        message: err.to_string(),
                        path,
                    });
                }
            }
        }

        for (index, diagnostic) in report.diagnostics.iter_mut().enumerate() {
            diagnostic.id = index;
        }

        report
    }

    /// Parses `path` and dumps the nodes that belong to it.
    pub fn dump_ast(&mut self, path: &Path) -> Result<AstDump, AnalysisError> {
        let tree = self.walker.parse(path)?;
        let file = tree.file_id(path);
        Ok(dump_tree(&tree, file, self.walker.sources_mut()))
    }
}
