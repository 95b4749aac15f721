//! too_many_params_in_func (CPP-000001): Limit the number of parameters a
//! function or method declares

use crate::declare_rule;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::walker::RuleContext;

pub const DEFAULT_MAX_PARAMS: usize = 4;

pub struct ParameterCount {
    max_params: usize,
}

declare_rule!(
    ParameterCount,
    id = "CPP-000001",
    name = "too_many_params_in_func",
    description = "Limit the number of parameters a function or method declares",
    severity = Warning,
    examples = "// Bad (more than 4 parameters)\nint blend(int r, int g, int b, int a, int mode);\n\n// Good\nstruct Rgba { int r, g, b, a; };\nint blend(Rgba color, int mode);"
);

impl ParameterCount {
    /// `max_params` of 0 means no limit.
    pub fn new(max_params: usize) -> Self {
        Self { max_params }
    }
}

impl Default for ParameterCount {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARAMS)
    }
}

impl Rule for ParameterCount {
    fn metadata(&self) -> &RuleMetadata {
        &Self::METADATA
    }

    fn inspect(&self, ctx: &mut RuleContext<'_>, node: &SyntaxNode) {
        if self.max_params == 0 || !node.kind.is_function_like() {
            return;
        }

        let params = ctx
            .tree()
            .children(node.id)
            .filter(|child| child.kind == NodeKind::ParmDecl)
            .count();

        if params > self.max_params {
            ctx.report(
                Self::METADATA.id,
                Self::METADATA.name,
                format!("there are too many parameters in func: {params} params found"),
                node,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run_rule;

    #[test]
    fn exactly_max_params_is_fine() {
        let diagnostics = run_rule(
            ParameterCount::default(),
            "int add(int a, int b, int c, int d) { return a; }\n",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn one_over_max_reports_count() {
        let diagnostics = run_rule(
            ParameterCount::default(),
            "int add(int a, int b, int c, int d, int e) { return a; }\n",
        );

        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.rule_id, "CPP-000001");
        assert_eq!(diagnostic.rule_name, "too_many_params_in_func");
        assert_eq!(
            diagnostic.message,
            "there are too many parameters in func: 5 params found"
        );
        assert_eq!(diagnostic.ast_kind, "FUNCTION_DECL");
        assert_eq!(diagnostic.line, Some(1));
        assert_eq!(diagnostic.column, Some(1));
    }

    #[test]
    fn prototypes_are_checked() {
        let diagnostics = run_rule(ParameterCount::new(2), "void draw(int x, int y, int z);\n");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "there are too many parameters in func: 3 params found"
        );
    }

    #[test]
    fn methods_are_checked() {
        let code = r#"
class Painter {
public:
    void stroke(int x, int y, int w, int h, int color) {}
};
"#;
        let diagnostics = run_rule(ParameterCount::default(), code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].ast_kind, "CXX_METHOD");
        assert_eq!(diagnostics[0].line, Some(4));
    }

    #[test]
    fn zero_disables_the_limit() {
        let diagnostics = run_rule(
            ParameterCount::new(0),
            "void f(int a, int b, int c, int d, int e, int f2) {}\n",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn void_parameter_list_counts_as_empty() {
        let diagnostics = run_rule(ParameterCount::new(1), "int main(void) { return 0; }\n");
        assert!(diagnostics.is_empty());
    }
}
