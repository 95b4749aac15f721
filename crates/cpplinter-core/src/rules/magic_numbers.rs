//! magic_number_usage (CPP-000003): Flag unexplained numeric literals
//!
//! Small values, round values and common powers of two are accepted, as is any
//! literal that directly initializes a named variable. The literal's source
//! text is parsed as written, so hexadecimal, octal, binary and suffixed
//! literals (`0x10`, `10UL`, `1.0f`) are never reported.

use tracing::trace;

use crate::declare_rule;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::walker::RuleContext;

pub const DEFAULT_IGNORED: [i64; 9] = [16, 32, 64, 128, 256, 512, 1024, 2048, 4096];

pub struct MagicNumbers {
    ignored: Vec<f64>,
}

declare_rule!(
    MagicNumbers,
    id = "CPP-000003",
    name = "magic_number_usage",
    description = "Disallow numeric literals that carry no descriptive name",
    severity = Warning,
    examples = "// Bad\nif (retries > 37) { abort(); }\n\n// Good\nconst int max_retries = 37;\nif (retries > max_retries) { abort(); }"
);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Literal {
    Integer(i128),
    Floating(f64),
}

impl MagicNumbers {
    /// Values in `extra` are ignored on top of [`DEFAULT_IGNORED`].
    pub fn new(extra: &[f64]) -> Self {
        let mut ignored: Vec<f64> = DEFAULT_IGNORED.iter().map(|&v| v as f64).collect();
        ignored.extend_from_slice(extra);
        Self { ignored }
    }

    fn is_listed(&self, value: f64) -> bool {
        self.ignored.iter().any(|&v| v == value || v == -value)
    }

    fn is_harmless(&self, literal: Literal) -> bool {
        match literal {
            Literal::Integer(v) => {
                v.unsigned_abs() < 10 || self.is_listed(v as f64) || v % 10 == 0 || v % 1024 == 0
            }
            Literal::Floating(v) => v.abs() < 10.0 || self.is_listed(v),
        }
    }
}

impl Default for MagicNumbers {
    fn default() -> Self {
        Self::new(&[])
    }
}

fn parse_literal(kind: &NodeKind, text: &str) -> Option<Literal> {
    match kind {
        NodeKind::IntegerLiteral => text.parse().ok().map(Literal::Integer),
        NodeKind::FloatingLiteral => text.parse().ok().map(Literal::Floating),
        _ => None,
    }
}

impl Rule for MagicNumbers {
    fn metadata(&self) -> &RuleMetadata {
        &Self::METADATA
    }

    fn inspect(&self, ctx: &mut RuleContext<'_>, node: &SyntaxNode) {
        if !node.kind.is_numeric_literal() {
            return;
        }

        let Ok(text) = ctx.source_text(node) else {
            return;
        };
        let Some(literal) = parse_literal(&node.kind, text.trim()) else {
            trace!(literal = %text, "skipping literal the plain parser cannot read");
            return;
        };

        if self.is_harmless(literal) {
            return;
        }

        if ctx
            .parent()
            .is_some_and(|parent| parent.kind == NodeKind::VarDecl)
        {
            return;
        }

        let value = match literal {
            Literal::Integer(v) => v.to_string(),
            Literal::Floating(v) => format!("{v:?}"),
        };
        ctx.report(
            Self::METADATA.id,
            Self::METADATA.name,
            format!("magic number {value} should not be used"),
            node,
        );
    }
}
