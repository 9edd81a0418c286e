//! Rule requiring sorted import statements.
//!
//! # Rationale
//!
//! Sorted imports are easier to scan and produce fewer merge conflicts.
//!
//! # Grouping
//!
//! Imports on consecutive lines form a group; a blank line, a comment line
//! or any other statement starts a new one. Each group is sorted on its own,
//! so intentional separations survive correction. Imports that share their
//! line with other code are not part of any group.
//!
//! # Configuration
//!
//! - `grouping`: `"names"` sorts by module path only (default);
//!   `"attributes"` puts attributed imports such as `@testable` first,
//!   ordered by their attributes, then sorts by path

use lintel_core::ast::{self, AstNode};
use lintel_core::syntax::{Keyword, TokenKind};
use lintel_core::{
    AbsolutePosition, ByteRange, Correction, CorrectionExample, Example, LintFile,
    ReasonedViolation, RuleConfiguration, RuleDescription, RuleExecutionError, RuleKind,
    RuleVisitor, Severity, SyntaxVisitor, VisitAction,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How imports within a group are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportGrouping {
    /// By module path, ignoring case.
    #[default]
    Names,
    /// Attributed imports first, by attribute text, then by module path.
    Attributes,
}

/// Configuration for [`SortedImportsRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SortedImportsConfiguration {
    /// Violation severity.
    pub severity: Severity,
    /// Ordering within a group.
    pub grouping: ImportGrouping,
}

impl Default for SortedImportsConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            grouping: ImportGrouping::Names,
        }
    }
}

impl RuleConfiguration for SortedImportsConfiguration {
    fn severity(&self) -> Severity {
        self.severity
    }
}

syntax_rule! {
    /// Flags imports that are out of order within their group.
    SortedImportsRule {
        configuration: SortedImportsConfiguration,
        visitor: SortedImportsVisitor,
        description: &RuleDescription {
            opt_in: true,
            correctable: true,
            non_triggering_examples: &[
                Example::new("import AAA\nimport BBB\nimport CCC\nimport DDD\n"),
                Example::new("import Alamofire\nimport API\n"),
                Example::new("import labc\nimport Ldef\n"),
                Example::new("import BBB\n// comment\nimport AAA\nimport CCC\n"),
                Example::new("@testable import AAA\nimport   CCC\n"),
                Example::new("import AAA\n@testable import BBB\n"),
                Example::new("import CCC\n\nimport AAA\n"),
                Example::new("import BBB // first\nimport CCC\n"),
                Example::new("import Foundation\nimport struct Foundation.URL\n"),
                Example::configured(
                    "@_exported import BBB\n@testable import AAA\nimport CCC\n",
                    "grouping = \"attributes\"",
                ),
            ],
            triggering_examples: &[
                Example::new("import AAA\nimport ZZZ\nimport ↓BBB\nimport CCC\n"),
                Example::new("import DDD\n// comment\nimport CCC\nimport ↓AAA\n"),
                Example::new("@testable import CCC\nimport   ↓AAA\n"),
                Example::new("import CCC\n@testable import ↓BBB\n"),
                Example::new("import BBB // first\nimport ↓AAA\n"),
                Example::configured(
                    "import AAA\n@testable import ↓BBB\n",
                    "grouping = \"attributes\"",
                ),
                Example::configured(
                    "@testable import BBB\n@_exported import ↓AAA\n",
                    "grouping = \"attributes\"",
                ),
            ],
            corrections: &[
                CorrectionExample::new(
                    Example::new("import AAA\nimport ZZZ\nimport ↓BBB\nimport CCC\n"),
                    "import AAA\nimport BBB\nimport CCC\nimport ZZZ\n",
                ),
                CorrectionExample::new(
                    Example::new("import DDD\n// comment\nimport CCC\nimport ↓AAA\n"),
                    "import DDD\n// comment\nimport AAA\nimport CCC\n",
                ),
                CorrectionExample::new(
                    Example::new("@testable import CCC\nimport   ↓AAA\n"),
                    "import   AAA\n@testable import CCC\n",
                ),
                CorrectionExample::new(
                    Example::new("import BBB // first\nimport ↓AAA\n"),
                    "import AAA\nimport BBB // first\n",
                ),
                CorrectionExample::new(
                    Example::configured(
                        "import AAA\n@testable import ↓BBB\n",
                        "grouping = \"attributes\"",
                    ),
                    "@testable import BBB\nimport AAA\n",
                ),
            ],
            ..RuleDescription::new(
                "sorted_imports",
                "Sorted Imports",
                "Imports should be sorted",
                RuleKind::Style,
            )
        },
    }
}

/// An import that stands alone on its line.
#[derive(Debug, Clone)]
struct ImportLine {
    line: usize,
    /// Lowercased module path.
    path: String,
    /// Attribute text such as `@testable`, space separated.
    attributes: String,
    /// Where a violation is reported: the first path component.
    name: AbsolutePosition,
}

impl ImportLine {
    fn compare(&self, other: &Self, grouping: ImportGrouping) -> Ordering {
        match grouping {
            ImportGrouping::Names => self.path.cmp(&other.path),
            ImportGrouping::Attributes => self
                .attributes
                .is_empty()
                .cmp(&other.attributes.is_empty())
                .then_with(|| self.attributes.cmp(&other.attributes))
                .then_with(|| self.path.cmp(&other.path)),
        }
    }
}

struct SortedImportsVisitor<'a> {
    configuration: &'a SortedImportsConfiguration,
    file: &'a LintFile,
    imports: Vec<ImportLine>,
}

impl<'a> SortedImportsVisitor<'a> {
    fn new(configuration: &'a SortedImportsConfiguration, file: &'a LintFile) -> Self {
        Self {
            configuration,
            file,
            imports: Vec::new(),
        }
    }

    /// Whether `range` is the only code on its line, allowing a trailing
    /// `//` comment.
    fn stands_alone(&self, start: AbsolutePosition, end: AbsolutePosition) -> Option<usize> {
        let lines = self.file.lines();
        let line = lines.line_column(start).line;
        if lines.line_column(end).line != line {
            return None;
        }
        let source = self.file.source();
        let line_start = lines.line_start(line)?.offset();
        let line_end = lines.line_end(line)?.offset();
        let before = source.get(line_start..start.offset())?;
        let after = source.get(end.offset()..line_end)?.trim();
        (before.trim().is_empty() && (after.is_empty() || after.starts_with("//"))).then_some(line)
    }

    /// Splits the collected imports into runs on consecutive lines.
    fn groups(&self) -> Vec<&[ImportLine]> {
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=self.imports.len() {
            let breaks = i == self.imports.len()
                || self.imports[i].line != self.imports[i - 1].line + 1;
            if breaks {
                groups.push(&self.imports[start..i]);
                start = i;
            }
        }
        groups
    }

    fn check_group(&self, group: &[ImportLine], violations: &mut Vec<ReasonedViolation>) {
        let grouping = self.configuration.grouping;
        let first_violation = violations.len();
        for pair in group.windows(2) {
            if pair[0].compare(&pair[1], grouping) == Ordering::Greater {
                violations.push(ReasonedViolation::new(pair[1].name));
            }
        }
        if violations.len() == first_violation {
            return;
        }
        if let Some(correction) = self.sorted_group(group) {
            let violation = violations.remove(first_violation);
            violations.insert(first_violation, violation.with_correction(correction));
        }
    }

    /// Replaces the group's lines with the same lines in sorted order.
    fn sorted_group(&self, group: &[ImportLine]) -> Option<Correction> {
        let lines = self.file.lines();
        let source = self.file.source();
        let (first, last) = (group.first()?, group.last()?);
        let start = lines.line_start(first.line)?;
        let end = lines.line_end(last.line)?;

        let mut sorted: Vec<&ImportLine> = group.iter().collect();
        sorted.sort_by(|a, b| a.compare(b, self.configuration.grouping));
        let texts = sorted
            .iter()
            .map(|import| {
                let from = lines.line_start(import.line)?.offset();
                let to = lines.line_end(import.line)?.offset();
                source.get(from..to)
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Correction::replace(ByteRange::new(start, end), texts.join("\n")))
    }
}

impl SyntaxVisitor for SortedImportsVisitor<'_> {
    fn visit_import_decl(&mut self, node: ast::ImportDecl<'_>) -> VisitAction {
        let syntax = node.syntax();
        let Some(line) = self.stands_alone(
            syntax.position_after_leading_trivia(),
            syntax.end_position_before_trailing_trivia(),
        ) else {
            return VisitAction::SkipChildren;
        };
        let name = syntax
            .child_tokens()
            .skip_while(|t| t.kind() != TokenKind::Keyword(Keyword::Import))
            .find(|t| t.kind() == TokenKind::Identifier && !t.is_missing());
        let Some(name) = name else {
            return VisitAction::SkipChildren;
        };
        let attributes: Vec<String> = node
            .attributes()
            .map(|a| a.syntax().trimmed_text())
            .collect();
        self.imports.push(ImportLine {
            line,
            path: node.path().to_lowercase(),
            attributes: attributes.join(" "),
            name: name.position_after_leading_trivia(),
        });
        VisitAction::SkipChildren
    }
}

impl RuleVisitor for SortedImportsVisitor<'_> {
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        let mut violations = Vec::new();
        for group in self.groups() {
            self.check_group(group, &mut violations);
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintel_core::testing::{correct_source, lint_source, verify_rule};

    #[test]
    fn examples() {
        verify_rule::<SortedImportsRule>();
    }

    #[test]
    fn one_correction_per_group() {
        let report = lint_source::<SortedImportsRule>(
            None,
            "import DDD\nimport CCC\nimport BBB\n\nimport ZZZ\nimport YYY\n",
        )
        .unwrap();
        let lines: Vec<_> = report.violations.iter().map(|v| v.location.line).collect();
        assert_eq!(lines, vec![2, 3, 6]);
        let corrected: Vec<_> = report
            .violations
            .iter()
            .map(|v| v.correction.is_some())
            .collect();
        assert_eq!(corrected, vec![true, false, true]);
    }

    #[test]
    fn groups_are_sorted_independently() {
        let (text, report) = correct_source::<SortedImportsRule>(
            None,
            "import DDD\nimport CCC\n\nimport BBB\nimport AAA\n",
        )
        .unwrap();
        assert_eq!(text, "import CCC\nimport DDD\n\nimport AAA\nimport BBB\n");
        assert!(report.violations.is_empty());
    }

    #[test]
    fn crlf_lines_keep_their_endings() {
        let (text, _) =
            correct_source::<SortedImportsRule>(None, "import BBB\r\nimport AAA\r\n").unwrap();
        assert_eq!(text, "import AAA\r\nimport BBB\r\n");
    }

    #[test]
    fn imports_sharing_a_line_are_ignored() {
        let report =
            lint_source::<SortedImportsRule>(None, "import BBB; import AAA\nimport CCC\n").unwrap();
        assert!(report.violations.is_empty());
    }

    #[test]
    fn unknown_grouping_is_rejected() {
        assert!(lint_source::<SortedImportsRule>(Some("grouping = \"length\""), "").is_err());
    }
}
