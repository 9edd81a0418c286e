//! Rule against whitespace around the `.` of a member access.
//!
//! # Rationale
//!
//! `foo .bar` and `foo. bar` hide the chain structure. The period stays
//! attached to both sides unless the chain deliberately breaks the line
//! before it.
//!
//! # Detected Patterns
//!
//! - Spaces or tabs between the base expression and `.`
//! - Spaces or tabs between `.` and the member name

use lintel_core::ast::{self, AstNode};
use lintel_core::syntax::{SyntaxToken, ViewMode};
use lintel_core::{
    ByteRange, Correction, CorrectionExample, Example, LintFile, ReasonedViolation,
    RuleDescription, RuleExecutionError, RuleKind, RuleVisitor, SeverityConfiguration,
    SyntaxVisitor, VisitAction,
};

syntax_rule! {
    /// Flags `foo .bar` and `foo. bar`.
    MemberAccessSpacingRule {
        configuration: SeverityConfiguration,
        visitor: MemberAccessVisitor,
        description: &RuleDescription {
            correctable: true,
            non_triggering_examples: &[
                Example::new("foo.bar\n"),
                Example::new("foo.bar().baz\n"),
                Example::new("foo\n    .bar()\n    .baz()\n"),
                Example::new("let x = .none\n"),
                Example::new("foo /* comment */ .bar\n"),
                Example::new("for i in 0 ..< 3 {}\n"),
            ],
            triggering_examples: &[
                Example::new("foo↓ .bar\n"),
                Example::new("foo()↓  .bar()\n"),
                Example::new("foo.↓ bar\n"),
                Example::new("foo↓ .↓ bar\n"),
                Example::new("foo\n    .bar↓ .baz()\n"),
            ],
            corrections: &[
                CorrectionExample::new(Example::new("foo↓ .bar\n"), "foo.bar\n"),
                CorrectionExample::new(Example::new("foo↓ .↓ bar\n"), "foo.bar\n"),
                CorrectionExample::new(
                    Example::new("foo\n    .bar↓\t.baz()\n"),
                    "foo\n    .bar.baz()\n",
                ),
            ],
            ..RuleDescription::new(
                "member_access_spacing",
                "Member Access Spacing",
                "There should be no whitespace around the period of a member access",
                RuleKind::Style,
            )
        },
    }
}

struct MemberAccessVisitor {
    violations: Vec<ReasonedViolation>,
}

impl MemberAccessVisitor {
    fn new(_configuration: &SeverityConfiguration, _file: &LintFile) -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Reports the horizontal whitespace between `left` and `right`, if any.
    fn check_gap(&mut self, left: SyntaxToken<'_>, right: SyntaxToken<'_>) {
        if right.is_missing() || !right.leading_trivia().is_empty() {
            return;
        }
        let gap = left.trailing_trivia();
        if gap.is_empty() || gap.contains_comments() {
            return;
        }
        let range = ByteRange::new(
            left.end_position_before_trailing_trivia(),
            right.position_after_leading_trivia(),
        );
        self.violations
            .push(ReasonedViolation::new(range.start).with_correction(Correction::remove(range)));
    }
}

impl SyntaxVisitor for MemberAccessVisitor {
    fn visit_member_access_expr(&mut self, node: ast::MemberAccessExpr<'_>) -> VisitAction {
        let Some(period) = node.period() else {
            return VisitAction::VisitChildren;
        };
        if let Some(last) = node
            .base()
            .and_then(|base| base.last_token(ViewMode::SourceAccurate))
        {
            self.check_gap(last, period);
        }
        if let Some(name) = node.name() {
            self.check_gap(period, name);
        }
        VisitAction::VisitChildren
    }
}

impl RuleVisitor for MemberAccessVisitor {
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
        verify_rule::<MemberAccessSpacingRule>();
    }

    #[test]
    fn line_broken_chains_are_allowed() {
        let source = "let total = items\n    .map { $0 }\n    .count\n";
        let report = lint_source::<MemberAccessSpacingRule>(None, source).unwrap();
        assert!(report.violations.is_empty());
    }

    #[test]
    fn whitespace_on_both_sides_is_two_violations() {
        let (text, report) = correct_source::<MemberAccessSpacingRule>(None, "a . b . c").unwrap();
        assert_eq!(text, "a.b.c");
        assert!(report.violations.is_empty());

        let report = lint_source::<MemberAccessSpacingRule>(None, "a . b . c").unwrap();
        let columns: Vec<_> = report.violations.iter().map(|v| v.location.column).collect();
        assert_eq!(columns, vec![2, 4, 6, 8]);
    }
}
