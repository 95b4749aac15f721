//! Dump-ast command - prints the syntax tree of one file

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use cpplinter_core::LintEngine;
use cpplinter_core::config::load_config_or_default_with_warnings;
use std::path::PathBuf;

use crate::output::write_output;

#[derive(Args, Debug)]
pub struct DumpAstArgs {
    /// C or C++ file to dump
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write the dump to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl DumpAstArgs {
    pub fn run(&self) -> Result<()> {
        let start_dir = self
            .file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let config_result = load_config_or_default_with_warnings(&start_dir);
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }

        let mut engine = LintEngine::with_config(&config_result.config);
        let dump = engine
            .dump_ast(&self.file)
            .with_context(|| format!("failed to dump {}", self.file.display()))?;

        let json = serde_json::to_string_pretty(&dump)?;
        write_output(self.output.as_deref(), &json)
    }
}
