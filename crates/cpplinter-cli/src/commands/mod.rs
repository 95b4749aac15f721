//! CLI command implementations

pub mod check;
pub mod dump_ast;
pub mod explain;

pub use check::CheckArgs;
pub use dump_ast::DumpAstArgs;
pub use explain::ExplainArgs;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze C/C++ files for issues
    Check(CheckArgs),

    /// Print the syntax tree of a single file as JSON
    DumpAst(DumpAstArgs),

    /// Show detailed explanation for a specific rule
    Explain(ExplainArgs),
}
