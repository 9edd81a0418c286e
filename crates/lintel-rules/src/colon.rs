//! Rule for colon spacing.
//!
//! # Rationale
//!
//! A colon belongs to the name on its left: `name: Type`, `label: value`,
//! `[Key: Value]`. It never takes space on the left and takes exactly one
//! space on the right.
//!
//! # Detected Patterns
//!
//! - Type annotations, parameters, inheritance and generic constraints
//! - Call argument labels
//! - Dictionary types and literals (unless `apply_to_dictionaries = false`)
//!
//! The ternary `? :` is not checked. A colon that starts or ends a line is
//! only checked on its other side.
//!
//! # Configuration
//!
//! - `flexible_right_spacing`: accept more than one space after the colon
//!   (default: false)
//! - `apply_to_dictionaries`: check dictionary types and literals (default: true)

use lintel_core::syntax::{NodeKind, SyntaxToken, TokenKind, ViewMode};
use lintel_core::{
    ByteRange, Correction, CorrectionExample, Example, LintFile, ReasonedViolation,
    RuleConfiguration, RuleDescription, RuleExecutionError, RuleKind, RuleVisitor, Severity,
    SyntaxVisitor,
};
use serde::{Deserialize, Serialize};

/// Configuration for [`ColonRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ColonConfiguration {
    /// Violation severity.
    pub severity: Severity,
    /// Accept any amount of horizontal space after the colon.
    pub flexible_right_spacing: bool,
    /// Check `[Key: Value]` types and literals.
    pub apply_to_dictionaries: bool,
}

impl Default for ColonConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            flexible_right_spacing: false,
            apply_to_dictionaries: true,
        }
    }
}

impl RuleConfiguration for ColonConfiguration {
    fn severity(&self) -> Severity {
        self.severity
    }
}

syntax_rule! {
    /// Flags colons with space before them or without exactly one space after.
    ColonRule {
        configuration: ColonConfiguration,
        visitor: ColonVisitor,
        description: &RuleDescription {
            correctable: true,
            non_triggering_examples: &[
                Example::new("let abc: Void\n"),
                Example::new("let abc: [Void: Void]\n"),
                Example::new("let abc: (Void, String, Int)\n"),
                Example::new("func abc(def: Void) {}\n"),
                Example::new("func abc(def: Void, ghi: Int) {}\n"),
                Example::new("class Foo: Bar {}\n"),
                Example::new("func foo<T: Equatable>(bar: T) {}\n"),
                Example::new("foo(bar: 1, baz: 2)\n"),
                Example::new("let abc = [\"key\": 1]\n"),
                Example::new("let abc = [:]\n"),
                Example::new("let abc = flag ? 1 : 2\n"),
                Example::new("foo(bar:\n    1)\n"),
                Example::configured("let abc:  Void\n", "flexible_right_spacing = true"),
                Example::configured("let abc = [\"key\" :1]\n", "apply_to_dictionaries = false"),
            ],
            triggering_examples: &[
                Example::new("let abc↓:Void\n"),
                Example::new("let abc↓  :Void\n"),
                Example::new("let abc↓ : Void\n"),
                Example::new("let abc↓:  Void\n"),
                Example::new("let abc: [Void↓:Void]\n"),
                Example::new("func abc(def↓:Void) {}\n"),
                Example::new("func abc(def↓ : Void, ghi↓:Int) {}\n"),
                Example::new("class Foo↓ : Bar {}\n"),
                Example::new("func foo<T↓ :Equatable>(bar: T) {}\n"),
                Example::new("foo(bar↓ :1)\n"),
                Example::new("let abc = [\"key\"↓ :1]\n"),
                Example::configured("let abc↓:Void\n", "flexible_right_spacing = true"),
                Example::configured("let abc↓ :  Void\n", "flexible_right_spacing = true"),
            ],
            corrections: &[
                CorrectionExample::new(Example::new("let abc↓:Void\n"), "let abc: Void\n"),
                CorrectionExample::new(Example::new("let abc↓ :  Void\n"), "let abc: Void\n"),
                CorrectionExample::new(
                    Example::new("foo(bar↓ :1, baz↓:2)\n"),
                    "foo(bar: 1, baz: 2)\n",
                ),
                CorrectionExample::new(
                    Example::new("class Foo↓ :Bar, Baz {}\n"),
                    "class Foo: Bar, Baz {}\n",
                ),
                CorrectionExample::new(
                    Example::configured("let abc↓ :   Void\n", "flexible_right_spacing = true"),
                    "let abc:   Void\n",
                ),
            ],
            ..RuleDescription::new(
                "colon",
                "Colon Spacing",
                "Colons should be next to the identifier when specifying a type and next to the key in dictionary literals",
                RuleKind::Style,
            )
        },
    }
}

struct ColonVisitor<'a> {
    configuration: &'a ColonConfiguration,
    violations: Vec<ReasonedViolation>,
}

impl<'a> ColonVisitor<'a> {
    fn new(configuration: &'a ColonConfiguration, _file: &LintFile) -> Self {
        Self {
            configuration,
            violations: Vec::new(),
        }
    }

    fn applies_to(&self, parent: NodeKind) -> bool {
        match parent {
            NodeKind::TypeAnnotation
            | NodeKind::Parameter
            | NodeKind::ParameterClause
            | NodeKind::InheritanceClause
            | NodeKind::GenericParameterClause
            | NodeKind::Argument => true,
            NodeKind::ArrayType | NodeKind::ArrayExpr => self.configuration.apply_to_dictionaries,
            _ => false,
        }
    }

    fn check(&mut self, colon: SyntaxToken<'_>) {
        let (Some(before), Some(after)) = (
            colon.previous_token(ViewMode::SourceAccurate),
            colon.next_token(ViewMode::SourceAccurate),
        ) else {
            return;
        };

        let left = before.trailing_trivia();
        let left_checked = colon.leading_trivia().is_empty() && !left.contains_comments();
        let left_wrong = left_checked && !left.is_empty();

        let right = colon.trailing_trivia();
        let right_checked = after.leading_trivia().is_empty()
            && !right.contains_comments()
            && !matches!(after.kind(), TokenKind::RightBracket | TokenKind::EndOfFile);
        let right_wrong = right_checked
            && if self.configuration.flexible_right_spacing {
                right.is_empty()
            } else {
                !right.is_single_space()
            };

        if !left_wrong && !right_wrong {
            return;
        }

        let start = if left_wrong {
            before.end_position_before_trailing_trivia()
        } else {
            colon.position_after_leading_trivia()
        };
        let (end, replacement) = if right_wrong {
            (after.position_after_leading_trivia(), ": ")
        } else {
            (colon.end_position_before_trailing_trivia(), ":")
        };
        self.violations.push(
            ReasonedViolation::new(start)
                .with_correction(Correction::replace(ByteRange::new(start, end), replacement)),
        );
    }
}

impl SyntaxVisitor for ColonVisitor<'_> {
    fn visit_token(&mut self, token: SyntaxToken<'_>) {
        if token.kind() != TokenKind::Colon {
            return;
        }
        if token
            .parent()
            .and_then(|p| p.node_kind())
            .is_some_and(|kind| self.applies_to(kind))
        {
            self.check(token);
        }
    }
}

impl RuleVisitor for ColonVisitor<'_> {
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
        verify_rule::<ColonRule>();
    }

    #[test]
    fn only_the_right_side_is_replaced_when_the_left_is_fine() {
        let report = lint_source::<ColonRule>(None, "let abc:Void").unwrap();
        let correction = report.violations[0].correction.clone().unwrap();
        assert_eq!(
            (correction.start.offset(), correction.end.offset()),
            (7, 8)
        );
        assert_eq!(correction.replacement, ": ");
    }

    #[test]
    fn ternary_colons_are_ignored() {
        let report = lint_source::<ColonRule>(None, "let x = a ? b :c\n").unwrap();
        assert!(report.violations.is_empty());
    }

    #[test]
    fn every_labeled_argument_is_fixed() {
        let (text, _) =
            correct_source::<ColonRule>(None, "let d = make(width:1 , height :2)\n").unwrap();
        assert_eq!(text, "let d = make(width: 1 , height: 2)\n");
    }
}
