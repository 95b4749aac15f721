//! Pretty formatter for human-readable terminal output
//!
//! Groups diagnostics by file and shows the offending code next to each one.

use colored::{ColoredString, Colorize};
use cpplinter_core::diagnostic::Diagnostic;
use cpplinter_core::rules::Severity;

pub struct PrettyFormatter;

impl PrettyFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();
        let mut current_file: Option<&str> = None;

        for diag in diagnostics {
            let file = diag.file.as_deref().unwrap_or("<unknown>");
            if current_file != Some(file) {
                if current_file.is_some() {
                    output.push('\n');
                }
                output.push_str(&format!("{}\n", file.underline()));
                current_file = Some(file);
            }
            output.push_str(&self.format_diagnostic(diag));
            output.push('\n');
        }

        if !diagnostics.is_empty() {
            output.push_str(&self.format_summary(diagnostics));
        }

        output
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{}[{}]: {}",
            colorize_severity(&diag.severity),
            diag.rule_name.dimmed(),
            diag.message
        ));

        let position = match (diag.line, diag.column) {
            (Some(line), Some(column)) => format!("{}:{}", line, column),
            _ => "?".to_string(),
        };
        lines.push(format!(
            "  {} {} {}",
            "-->".blue(),
            position,
            diag.ast_kind.dimmed()
        ));

        if let Some(snippet) = &diag.snippet {
            lines.push(format!("   {} {}", "|".blue(), snippet));
        }

        lines.join("\n")
    }

    fn format_summary(&self, diagnostics: &[Diagnostic]) -> String {
        let error_count = diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
            .count();
        let warning_count = diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
            .count();

        let total = diagnostics.len();

        let errors_str = if error_count == 1 {
            format!("{} error", error_count)
        } else {
            format!("{} errors", error_count)
        };

        let warnings_str = if warning_count == 1 {
            format!("{} warning", warning_count)
        } else {
            format!("{} warnings", warning_count)
        };

        let problems_str = if total == 1 { "problem" } else { "problems" };

        format!(
            "\nFound {} {} ({}, {})\n",
            total.to_string().bold(),
            problems_str,
            errors_str.red(),
            warnings_str.yellow()
        )
    }
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn colorize_severity(severity: &Severity) -> ColoredString {
    match severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
        Severity::Hint => "hint".cyan().bold(),
    }
}
