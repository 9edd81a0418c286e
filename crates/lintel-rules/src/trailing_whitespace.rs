//! Rule against whitespace at the end of a line.
//!
//! # Rationale
//!
//! Trailing whitespace is invisible noise that shows up in every diff.
//!
//! # Configuration
//!
//! - `ignores_empty_lines`: skip lines holding only whitespace (default: false)
//! - `ignores_comments`: skip whitespace that belongs to a comment, such as
//!   the end of a `//` comment or a line inside `/* */` (default: true)
//!
//! Whitespace inside multi-line string literals is never reported; removing
//! it would change the string.

use lintel_core::syntax::{SyntaxToken, TokenKind, Trivia};
use lintel_core::{
    AbsolutePosition, ByteRange, Correction, CorrectionExample, Example, LintFile,
    ReasonedViolation, RuleConfiguration, RuleDescription, RuleExecutionError, RuleKind,
    RuleVisitor, Severity, SyntaxVisitor,
};
use serde::{Deserialize, Serialize};

/// Configuration for [`TrailingWhitespaceRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrailingWhitespaceConfiguration {
    /// Violation severity.
    pub severity: Severity,
    /// Skip lines that contain nothing but whitespace.
    pub ignores_empty_lines: bool,
    /// Skip whitespace that is part of a comment.
    pub ignores_comments: bool,
}

impl Default for TrailingWhitespaceConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            ignores_empty_lines: false,
            ignores_comments: true,
        }
    }
}

impl RuleConfiguration for TrailingWhitespaceConfiguration {
    fn severity(&self) -> Severity {
        self.severity
    }
}

syntax_rule! {
    /// Flags lines that end in spaces or tabs.
    TrailingWhitespaceRule {
        configuration: TrailingWhitespaceConfiguration,
        visitor: TrailingWhitespaceVisitor,
        description: &RuleDescription {
            correctable: true,
            non_triggering_examples: &[
                Example::new("let name: String\n"),
                Example::new("//\n"),
                Example::new("// \n"),
                Example::new("let name: String // \n"),
                Example::new("/*\n  comment line  \n*/\n"),
                Example::new("let text = \"\"\"\n    keep  \n    \"\"\"\n"),
                Example::configured("let a = 1\n    \nlet b = 2\n", "ignores_empty_lines = true"),
            ],
            triggering_examples: &[
                Example::new("let name: String↓ \n"),
                Example::new("let name: String↓\t\n"),
                Example::new("/* */ let name: String↓ \n"),
                Example::new("let a = 1\n↓    \nlet b = 2\n"),
                Example::new("let a = 1↓  "),
                Example::configured("//↓ \n", "ignores_comments = false"),
                Example::configured("let name: String //↓  \n", "ignores_comments = false"),
            ],
            corrections: &[
                CorrectionExample::new(Example::new("let name: String↓ \n"), "let name: String\n"),
                CorrectionExample::new(
                    Example::new("/* */ let name: String↓ \n"),
                    "/* */ let name: String\n",
                ),
                CorrectionExample::new(
                    Example::new("let a = 1↓ \r\nlet b = 2↓\t\r\n"),
                    "let a = 1\r\nlet b = 2\r\n",
                ),
                CorrectionExample::new(
                    Example::configured("// todo↓  \n", "ignores_comments = false"),
                    "// todo\n",
                ),
            ],
            ..RuleDescription::new(
                "trailing_whitespace",
                "Trailing Whitespace",
                "Lines should not have trailing whitespace",
                RuleKind::Style,
            )
        },
    }
}

/// Collects comment and string spans during the walk, then scans lines.
struct TrailingWhitespaceVisitor<'a> {
    configuration: &'a TrailingWhitespaceConfiguration,
    file: &'a LintFile,
    comments: Vec<ByteRange>,
    strings: Vec<ByteRange>,
}

impl<'a> TrailingWhitespaceVisitor<'a> {
    fn new(configuration: &'a TrailingWhitespaceConfiguration, file: &'a LintFile) -> Self {
        Self {
            configuration,
            file,
            comments: Vec::new(),
            strings: Vec::new(),
        }
    }

    fn record_comments(&mut self, trivia: &Trivia, start: AbsolutePosition) {
        let mut offset = start;
        for piece in trivia.pieces() {
            let end = offset + piece.len();
            if piece.is_comment() {
                self.comments.push(ByteRange::new(offset, end));
            }
            offset = end;
        }
    }

    /// Whether `position` lies strictly inside one of `spans`.
    fn covered(spans: &[ByteRange], position: AbsolutePosition) -> bool {
        spans
            .iter()
            .any(|span| span.start < position && position < span.end)
    }

    fn violation(&self, line: usize) -> Option<ReasonedViolation> {
        let text = self.file.line_text(line)?;
        let start = self.file.lines().line_start(line)?;
        let content = text.trim_end_matches([' ', '\t']);
        if content.len() == text.len() {
            return None;
        }
        if content.is_empty() && self.configuration.ignores_empty_lines {
            return None;
        }

        let range = ByteRange::new(start + content.len(), start + text.len());
        if Self::covered(&self.strings, range.start) {
            return None;
        }
        if self.configuration.ignores_comments && Self::covered(&self.comments, range.start) {
            return None;
        }
        Some(ReasonedViolation::new(range.start).with_correction(Correction::remove(range)))
    }
}

impl SyntaxVisitor for TrailingWhitespaceVisitor<'_> {
    fn visit_token(&mut self, token: SyntaxToken<'_>) {
        self.record_comments(token.leading_trivia(), token.position());
        self.record_comments(
            token.trailing_trivia(),
            token.end_position_before_trailing_trivia(),
        );
        if token.kind() == TokenKind::StringLiteral && token.text().contains('\n') {
            self.strings.push(token.text_range());
        }
    }
}

impl RuleVisitor for TrailingWhitespaceVisitor<'_> {
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        let lines = self.file.lines().line_count();
        Ok((1..=lines).filter_map(|line| self.violation(line)).collect())
    }
}
