//! JSON output formatter
//!
//! Emits the report list: one object per diagnostic, in discovery order.

use cpplinter_core::diagnostic::Diagnostic;
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        serde_json::to_string_pretty(diagnostics).unwrap_or_else(|_| "[]".to_string())
    }

    /// The findings of a single file, numbered from 0 again.
    pub fn format_file(&self, diagnostics: &[Diagnostic], file: &Path) -> String {
        let file = file.display().to_string();
        let own: Vec<Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.file.as_deref() == Some(file.as_str()))
            .cloned()
            .enumerate()
            .map(|(id, mut d)| {
                d.id = id;
                d
            })
            .collect();
        self.format(&own)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
