//! Core types for violations, corrections and results.

use crate::error::RuleExecutionError;
use crate::position::{AbsolutePosition, ByteRange};
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for lint violations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Should be addressed; does not fail the run.
    #[default]
    Warning,
    /// Must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A proposed replacement of the half-open byte range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Correction {
    /// First replaced byte.
    pub start: AbsolutePosition,
    /// One past the last replaced byte.
    pub end: AbsolutePosition,
    /// Text substituted for the range.
    pub replacement: String,
}

impl Correction {
    /// Replaces `range` with `replacement`.
    #[must_use]
    pub fn replace(range: ByteRange, replacement: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            replacement: replacement.into(),
        }
    }

    /// Deletes `range`.
    #[must_use]
    pub fn remove(range: ByteRange) -> Self {
        Self::replace(range, "")
    }

    /// Inserts `text` at `at`.
    #[must_use]
    pub fn insert(at: AbsolutePosition, text: impl Into<String>) -> Self {
        Self::replace(ByteRange::new(at, at), text)
    }

    /// The replaced range.
    #[must_use]
    pub fn range(&self) -> ByteRange {
        ByteRange {
            start: self.start,
            end: self.end,
        }
    }
}

/// What a rule visitor reports: a position plus optional details.
///
/// The reason defaults to the rule description and the severity to the
/// rule's configured severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonedViolation {
    /// Where the violation is.
    pub position: AbsolutePosition,
    /// Specific reason, if different from the rule description.
    pub reason: Option<String>,
    /// Severity override, e.g. from a threshold.
    pub severity: Option<Severity>,
    /// Edit that fixes the violation.
    pub correction: Option<Correction>,
}

impl ReasonedViolation {
    /// A violation at `position` with all defaults.
    #[must_use]
    pub fn new(position: AbsolutePosition) -> Self {
        Self {
            position,
            reason: None,
            severity: None,
            correction: None,
        }
    }

    /// Sets a specific reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Attaches a correction.
    #[must_use]
    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = Some(correction);
        self
    }
}

impl From<AbsolutePosition> for ReasonedViolation {
    fn from(position: AbsolutePosition) -> Self {
        Self::new(position)
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path, if the source came from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub column: usize,
    /// Byte offset in the file.
    pub offset: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: Option<PathBuf>, line: usize, column: usize, offset: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file.display(), self.line, self.column),
            None => write!(f, "<input>:{}:{}", self.line, self.column),
        }
    }
}

/// A resolved violation ready for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleViolation {
    /// Rule identifier (e.g., "colon").
    pub rule_id: String,
    /// Human readable rule name (e.g., "Colon Spacing").
    pub rule_name: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Where it is.
    pub location: Location,
    /// Human-readable message.
    pub reason: String,
    /// Edit that fixes it, in the coordinates of the linted buffer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<Correction>,
}

impl StyleViolation {
    /// Byte offset of the violation.
    #[must_use]
    pub fn position(&self) -> AbsolutePosition {
        AbsolutePosition(self.location.offset)
    }
}

impl std::fmt::Display for StyleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location, self.severity, self.rule_id, self.reason
        )
    }
}

/// Converts a violation to a miette diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
    #[source_code]
    source_code: Option<miette::NamedSource<String>>,
}

impl ViolationDiagnostic {
    /// Attaches the file contents so the diagnostic renders a snippet.
    #[must_use]
    pub fn with_source(mut self, name: impl AsRef<str>, source: String) -> Self {
        self.source_code = Some(miette::NamedSource::new(name, source));
        self
    }
}

impl From<&StyleViolation> for ViolationDiagnostic {
    fn from(v: &StyleViolation) -> Self {
        let length = v
            .correction
            .as_ref()
            .map_or(0, |c| c.end.offset().saturating_sub(c.start.offset()));
        Self {
            message: format!("[{}] {}", v.rule_id, v.reason),
            help: v
                .correction
                .as_ref()
                .map(|_| "run `lintel correct` to fix".to_string()),
            span: SourceSpan::from((v.location.offset, length)),
            label_message: format!("{}: {}", v.severity, v.rule_name),
            source_code: None,
        }
    }
}

/// A correction that was applied, for reporting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// Rule that proposed the edit.
    pub rule_id: String,
    /// Where the edit started, in the buffer it was applied to.
    pub location: Location,
    /// Rule description text.
    pub description: String,
}

impl std::fmt::Display for CorrectionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: corrected [{}] {}",
            self.location, self.rule_id, self.description
        )
    }
}

/// A file that could not be analyzed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    /// The file.
    pub file: PathBuf,
    /// What went wrong.
    pub message: String,
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<StyleViolation>,
    /// Corrections applied in correct mode.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<CorrectionRecord>,
    /// Files that failed to read or parse.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_errors: Vec<FileError>,
    /// Isolated rule failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_errors: Vec<RuleExecutionError>,
    /// Number of files checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Whether the run should exit non-zero.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.has_errors() || !self.file_errors.is_empty()
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&StyleViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Counts violations as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        (errors, self.violations.len() - errors)
    }

    /// One-line summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let (errors, warnings) = self.count_by_severity();
        let mut summary = format!(
            "Found {} error(s), {} warning(s) in {} file(s)",
            errors, warnings, self.files_checked
        );
        if !self.corrections.is_empty() {
            summary.push_str(&format!("; {} correction(s) applied", self.corrections.len()));
        }
        summary
    }

    /// Adds everything from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.corrections.extend(other.corrections);
        self.file_errors.extend(other.file_errors);
        self.rule_errors.extend(other.rule_errors);
        self.files_checked += other.files_checked;
    }
}
