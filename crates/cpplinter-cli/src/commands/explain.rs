//! Explain command - provides detailed explanation of a rule

use clap::Args;
use colored::Colorize;
use cpplinter_core::LintEngine;
use cpplinter_core::config::load_config_or_default_with_warnings;
use cpplinter_core::rules::Severity;
use std::env;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    #[arg(
        value_name = "RULE_ID",
        help = "Rule ID or name to explain (e.g., \"CPP-000003\", \"magic_number_usage\")"
    )]
    pub rule_id: String,
}

impl ExplainArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let cwd = env::current_dir()?;
        let config = load_config_or_default_with_warnings(&cwd).config;
        let engine = LintEngine::with_config(&config);
        let registry = engine.registry();

        let rule = registry
            .get_rule(&self.rule_id)
            .or_else(|| registry.get_rule_by_name(&self.rule_id));

        match rule {
            Some(rule) => {
                let metadata = rule.metadata();

                println!();
                println!("{}", format!("Rule {}", metadata.id).bold());
                println!();
                println!("  {}: {}", "Name".cyan(), metadata.name);
                println!("  {}: {}", "Description".cyan(), metadata.description);
                println!(
                    "  {}: {}",
                    "Severity".cyan(),
                    format_severity(&registry.effective_severity(rule))
                );

                if let Some(examples) = metadata.examples {
                    println!();
                    println!("  {}:", "Examples".cyan());
                    for line in examples.lines() {
                        println!("    {}", line);
                    }
                }

                println!();
                if registry.is_rule_enabled(metadata.id) {
                    println!("  {}: {}", "Status".cyan(), "enabled".green());
                } else {
                    println!("  {}: {}", "Status".cyan(), "disabled".red());
                }
                println!();

                Ok(())
            }
            None => {
                eprintln!(
                    "{} unknown rule '{}'",
                    "error:".red().bold(),
                    self.rule_id
                );
                eprintln!();
                eprintln!("Available rules:");

                for rule in registry.rules() {
                    let meta = rule.metadata();
                    eprintln!("  {} ({})", meta.id, meta.name);
                }

                std::process::exit(1);
            }
        }
    }
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Error => "error".red().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
        Severity::Info => "info".blue().to_string(),
        Severity::Hint => "hint".cyan().to_string(),
    }
}
