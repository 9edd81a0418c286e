//! Rule against whitespace between a callee and its argument list.
//!
//! # Rationale
//!
//! `foo ()` reads like two separate expressions. Calls keep the opening
//! parenthesis attached to whatever is being called.
//!
//! # Detected Patterns
//!
//! - Spaces or tabs between the called expression and `(`
//!
//! A gap that contains a comment is left alone; the parser never treats a
//! `(` on the next line as a call.

use lintel_core::ast::{self, AstNode};
use lintel_core::syntax::ViewMode;
use lintel_core::{
    ByteRange, Correction, CorrectionExample, Example, LintFile, ReasonedViolation,
    RuleDescription, RuleExecutionError, RuleKind, RuleVisitor, SeverityConfiguration,
    SyntaxVisitor, VisitAction,
};

syntax_rule! {
    /// Flags `foo ()` and corrects it to `foo()`.
    FunctionCallSpacingRule {
        configuration: SeverityConfiguration,
        visitor: CallSpacingVisitor,
        description: &RuleDescription {
            correctable: true,
            non_triggering_examples: &[
                Example::new("foo()\n"),
                Example::new("foo(bar, baz)\n"),
                Example::new("foo.bar(1).baz()\n"),
                Example::new("foo { $0 }\n"),
                Example::new("let tuple = (1, 2)\n"),
                Example::new("foo /* why */ ()\n"),
            ],
            triggering_examples: &[
                Example::new("foo↓ ()\n"),
                Example::new("foo↓  (bar: 1)\n"),
                Example::new("foo↓\t()\n"),
                Example::new("foo.bar↓ ()\n"),
                Example::new("foo↓ (bar↓ ())\n"),
                Example::new("let x = compute↓ () + 1\n"),
            ],
            corrections: &[
                CorrectionExample::new(Example::new("foo↓ ()\n"), "foo()\n"),
                CorrectionExample::new(Example::new("foo↓ (bar↓ ())\n"), "foo(bar())\n"),
                CorrectionExample::new(Example::new("a.b↓ (1) { $0 }\n"), "a.b(1) { $0 }\n"),
            ],
            ..RuleDescription::new(
                "function_call_spacing",
                "Function Call Spacing",
                "There should be no space between a function name and the opening parenthesis",
                RuleKind::Style,
            )
        },
    }
}

struct CallSpacingVisitor {
    violations: Vec<ReasonedViolation>,
}

impl CallSpacingVisitor {
    fn new(_configuration: &SeverityConfiguration, _file: &LintFile) -> Self {
        Self {
            violations: Vec::new(),
        }
    }
}

impl SyntaxVisitor for CallSpacingVisitor {
    fn visit_function_call_expr(&mut self, node: ast::FunctionCallExpr<'_>) -> VisitAction {
        let (Some(callee), Some(paren)) = (node.called_expression(), node.left_paren()) else {
            return VisitAction::VisitChildren;
        };
        if paren.is_missing() {
            return VisitAction::VisitChildren;
        }
        let Some(last) = callee.last_token(ViewMode::SourceAccurate) else {
            return VisitAction::VisitChildren;
        };

        let gap = last.trailing_trivia();
        if gap.is_empty() || gap.contains_comments() || !paren.leading_trivia().is_empty() {
            return VisitAction::VisitChildren;
        }

        let range = ByteRange::new(
            last.end_position_before_trailing_trivia(),
            paren.position_after_leading_trivia(),
        );
        self.violations
            .push(ReasonedViolation::new(range.start).with_correction(Correction::remove(range)));
        VisitAction::VisitChildren
    }
}

impl RuleVisitor for CallSpacingVisitor {
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        Ok(self.violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintel_core::testing::{correct_source, lint_source, verify_rule};

    #[test]
    fn examples() {
        verify_rule::<FunctionCallSpacingRule>();
    }

    #[test]
    fn reports_the_offset_of_the_gap() {
        let report = lint_source::<FunctionCallSpacingRule>(None, "foo ()").unwrap();
        assert_eq!(report.violations.len(), 1);
        let violation = &report.violations[0];
        assert_eq!(violation.location.offset, 3);
        assert_eq!((violation.location.line, violation.location.column), (1, 4));
        insta::assert_snapshot!(
            violation.to_string(),
            @"<input>:1:4: warning [function_call_spacing] There should be no space between a function name and the opening parenthesis"
        );
    }

    #[test]
    fn tight_calls_are_clean() {
        let report = lint_source::<FunctionCallSpacingRule>(None, "foo()").unwrap();
        assert!(report.violations.is_empty());
    }

    #[test]
    fn adjacent_calls_are_corrected_independently() {
        let report = lint_source::<FunctionCallSpacingRule>(None, "foo ()  .bar ()").unwrap();
        let offsets: Vec<_> = report.violations.iter().map(|v| v.location.offset).collect();
        assert_eq!(offsets, vec![3, 12]);

        let (text, _) = correct_source::<FunctionCallSpacingRule>(None, "foo ()  .bar ()").unwrap();
        assert_eq!(text, "foo()  .bar()");
    }

    #[test]
    fn severity_is_configurable() {
        let report =
            lint_source::<FunctionCallSpacingRule>(Some("severity = \"error\""), "foo ()").unwrap();
        assert_eq!(report.violations[0].severity, lintel_core::Severity::Error);
    }
}
