//! cpplinter - Command-line interface for the cpplinter static checker
//!
//! Checks C and C++ source trees against a small set of structural rules.

mod commands;
mod logging;
mod output;

use clap::Parser;
use commands::Commands;
use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "cpplinter",
    author,
    version,
    about = "AST-based static checker for C and C++ source trees",
    long_about = "cpplinter parses C and C++ files and reports functions with too many\n\
                  parameters, overly long function bodies and unexplained numeric literals.\n\n\
                  Configure thresholds in a cpplinter.toml next to or above the checked path."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set the log level
    #[arg(long, value_enum, global = true, default_value = "warn")]
    pub log_level: LogLevel,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level, cli.log_json);

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::DumpAst(args) => args.run(),
        Commands::Explain(args) => args.run(),
    }
}
