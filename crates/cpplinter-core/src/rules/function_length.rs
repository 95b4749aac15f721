//! too_long_function_body (CPP-000002): Limit how many lines a function body
//! may span

use crate::declare_rule;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::walker::RuleContext;

pub const DEFAULT_MAX_LINES: usize = 16;

pub struct FunctionLength {
    max_lines: usize,
}

declare_rule!(
    FunctionLength,
    id = "CPP-000002",
    name = "too_long_function_body",
    description = "Limit how many lines a function body may span",
    severity = Warning,
    examples = "// Bad: one body doing parsing, validation and output\nvoid run() {\n    // ... 40 lines ...\n}\n\n// Good: split into steps\nvoid run() {\n    auto input = parse();\n    validate(input);\n    emit(input);\n}"
);

impl FunctionLength {
    /// `max_lines` of 0 means no limit.
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }
}

impl Default for FunctionLength {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl Rule for FunctionLength {
    fn metadata(&self) -> &RuleMetadata {
        &Self::METADATA
    }

    fn inspect(&self, ctx: &mut RuleContext<'_>, node: &SyntaxNode) {
        if self.max_lines == 0 || !node.kind.is_function_like() {
            return;
        }

        let tree = ctx.tree();
        let Some(body) = tree
            .children(node.id)
            .find(|child| child.kind == NodeKind::CompoundStmt)
        else {
            return;
        };

        let lines = body
            .extent
            .end
            .line
            .saturating_sub(body.extent.start.line);
        if lines > self.max_lines {
            ctx.report(
                Self::METADATA.id,
                Self::METADATA.name,
                format!("too long function body: {lines} lines"),
                body,
            );
        }
    }
}
