//! Rule-based static analysis for C and C++ source trees.
//!
//! Source text is decoded through a bounded [`source::SourceCache`], turned
//! into a [`syntax::SyntaxTree`] by a [`syntax::SyntaxProvider`], and walked
//! node by node by a [`walker::TreeWalker`] that hands every node of the file
//! under analysis to each enabled [`rules::Rule`].

pub mod config;
pub mod diagnostic;
pub mod discovery;
pub mod dump;
pub mod engine;
pub mod rules;
pub mod source;
pub mod syntax;
pub mod walker;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, ConfigError};
pub use diagnostic::{Diagnostic, DiagnosticSink};
pub use engine::{CheckReport, FileFailure, LintEngine};
pub use rules::{Rule, RuleMetadata, RuleRegistry, Severity};
pub use source::{SourceCache, SourceError};
pub use syntax::{ParseError, SyntaxProvider, SyntaxTree};
pub use walker::{AnalysisError, RuleContext, TreeWalker, WalkState};
