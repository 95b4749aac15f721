//! Check command - analyzes C/C++ files for issues

use crate::output::json::JsonFormatter;
use crate::output::pretty::{PrettyFormatter, colorize_severity};
use crate::output::write_output;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cpplinter_core::LintEngine;
use cpplinter_core::config::load_config_or_default_with_warnings;
use cpplinter_core::diagnostic::Diagnostic;
use cpplinter_core::engine::CheckReport;
use cpplinter_core::rules::Severity;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to file or directory to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format for diagnostics (pretty, text, json)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write one `<file>.err.json` report per checked file into DIR
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Fail on warnings (exit code 1)
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Filter diagnostics by minimum severity level (error, warning, info, hint)
    #[arg(long, value_name = "LEVEL")]
    pub severity: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();
        let started = Instant::now();

        let config_result = load_config_or_default_with_warnings(&self.config_dir());
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }

        let min_severity = self.parse_severity()?;
        let mut engine = LintEngine::with_config(&config_result.config);
        let report = engine.check_tree(&self.path);

        if report.files_checked == 0 {
            println!("No C/C++ source files found.");
            return Ok(());
        }

        if let Some(dir) = &self.report_dir {
            self.write_file_reports(dir, &report)?;
        }

        let diagnostics: Vec<Diagnostic> = report
            .diagnostics
            .iter()
            .filter(|d| d.severity.level() >= min_severity.level())
            .cloned()
            .collect();

        let rendered = match self.format.as_str() {
            "json" => JsonFormatter::new().format(&diagnostics),
            "text" => format_text(&diagnostics),
            _ => PrettyFormatter::new().format(&diagnostics),
        };
        if !rendered.is_empty() {
            write_output(self.output.as_deref(), rendered.trim_end())?;
        }

        print_summary(&report, started);

        let error_count = diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
            .count();
        let warning_count = diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
            .count();

        let has_errors = error_count > 0;
        let has_warnings = warning_count > 0 && self.fail_on_warnings;

        if has_errors || has_warnings {
            process::exit(1);
        }

        Ok(())
    }

    fn config_dir(&self) -> PathBuf {
        if self.path.is_file() {
            self.path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
        } else {
            self.path.clone()
        }
    }

    fn parse_severity(&self) -> Result<Severity> {
        match self.severity.as_deref() {
            Some("error") => Ok(Severity::Error),
            Some("warning") => Ok(Severity::Warning),
            Some("info") => Ok(Severity::Info),
            Some("hint") => Ok(Severity::Hint),
            Some(other) => anyhow::bail!(
                "Invalid severity '{}'. Valid values: error, warning, info, hint",
                other
            ),
            None => Ok(Severity::Hint),
        }
    }

    fn configure_colors(&self) {
        let no_color_env = std::env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }

    /// Every file that could be checked gets a report, even an empty one.
    fn write_file_reports(&self, dir: &Path, report: &CheckReport) -> Result<()> {
        let formatter = JsonFormatter::new();
        for file in &report.passed {
            let target = dir.join(report_name(&self.path, file));
            write_output(Some(&target), &formatter.format_file(&report.diagnostics, file))?;
        }
        Ok(())
    }
}

/// `<path relative to root>.err.json`, or just the file name when `file` is
/// the root itself.
fn report_name(root: &Path, file: &Path) -> PathBuf {
    let relative = match file.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| file.to_path_buf()),
    };
    let mut name = relative.into_os_string();
    name.push(".err.json");
    PathBuf::from(name)
}

fn format_text(diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for diag in diagnostics {
        output.push_str(&format!(
            "{}:{}:{}: {} [{}]: {}\n",
            diag.file.as_deref().unwrap_or("<unknown>"),
            diag.line.unwrap_or(0),
            diag.column.unwrap_or(0),
            colorize_severity(&diag.severity),
            diag.rule_id.dimmed(),
            diag.message
        ));
    }
    output
}

fn print_summary(report: &CheckReport, started: Instant) {
    for failure in &report.failures {
        eprintln!(
            "{} skipped {}: {}",
            "warning:".yellow().bold(),
            failure.path.display(),
            failure.message
        );
    }

    eprintln!(
        "{} pass; {} fail; {}% in {:.2?}",
        report.files_passed().to_string().green(),
        report.failures.len().to_string().red(),
        report.pass_rate(),
        started.elapsed()
    );
}
