//! Diagnostic reporting for analysis results
//!
//! A [`Diagnostic`] is one finding; the [`DiagnosticSink`] collects them in
//! discovery order during a single walk.

use serde::{Deserialize, Serialize};

use crate::rules::Severity;

const SNIPPET_MAX_CHARS: usize = 32;
const SNIPPET_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: usize,
    pub rule_id: String,
    pub rule_name: String,
    #[serde(rename = "rule_text")]
    pub message: String,
    pub ast_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(rename = "err_code", default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        message: impl Into<String>,
        ast_kind: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: 0,
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            message: message.into(),
            ast_kind: ast_kind.into(),
            file: None,
            line: None,
            column: None,
            snippet: None,
            severity,
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: usize, column: usize) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// Shortens `text` to 32 characters plus `...` and flattens line breaks and
/// tabs into spaces.
pub fn make_snippet(text: &str) -> String {
    let mut snippet: String = if text.chars().count() > SNIPPET_MAX_CHARS {
        let mut head: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
        head.push_str(SNIPPET_ELLIPSIS);
        head
    } else {
        text.to_string()
    };
    snippet = snippet.replace(['\n', '\t', '\r'], " ");
    snippet
}

/// Append-only store of the diagnostics produced by one walk.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `diagnostic`, stamping its ordinal position as the id.
    pub fn push(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.id = self.diagnostics.len();
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
