//! Verifies rules against their own example corpora.
//!
//! Every rule description carries non-triggering, triggering and correction
//! examples. [`verify_rule`] runs all of them through a [`Linter`] holding
//! just that rule and panics with a readable report on the first mismatch
//! set, so a rule test is one line:
//!
//! ```ignore
//! #[test]
//! fn examples() {
//!     lintel_core::testing::verify_rule::<ColonRule>();
//! }
//! ```

use crate::context::LintFile;
use crate::description::{strip_markers, Example};
use crate::linter::{ActiveRule, FileReport, Linter};
use crate::position::AbsolutePosition;
use crate::rule::ConfigurableRule;
use std::fmt;

/// Which corpus check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// A non-triggering example produced violations.
    NonTriggering,
    /// A triggering example did not produce violations exactly at its markers.
    Triggering,
    /// A correction example did not correct to its expected output.
    Correction,
    /// A triggering example still triggered behind a disable command.
    DisableCommand,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NonTriggering => "non-triggering",
            Self::Triggering => "triggering",
            Self::Correction => "correction",
            Self::DisableCommand => "disable command",
        };
        f.write_str(name)
    }
}

/// One failed example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleFailure {
    /// The failed check.
    pub check: Check,
    /// The example code as linted.
    pub code: String,
    /// What differed.
    pub message: String,
}

impl fmt::Display for ExampleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.check, self.message)?;
        for line in self.code.lines() {
            writeln!(f, "    | {line}")?;
        }
        Ok(())
    }
}

/// Runs every example of `R` and panics if any of them fails.
///
/// # Panics
///
/// Panics with a report listing all failed examples.
pub fn verify_rule<R: ConfigurableRule>() {
    let failures = check_examples::<R>();
    if !failures.is_empty() {
        let mut report = format!(
            "\n=== {}: {} example(s) failed ===\n\n",
            R::DESCRIPTION.identifier,
            failures.len()
        );
        for failure in &failures {
            report.push_str(&failure.to_string());
            report.push('\n');
        }
        panic!("{report}");
    }
}

/// Runs every example of `R` and returns the failures.
#[must_use]
pub fn check_examples<R: ConfigurableRule>() -> Vec<ExampleFailure> {
    let description = R::DESCRIPTION;
    let mut failures = Vec::new();

    for example in description.non_triggering_examples {
        let (code, _) = example.strip_markers();
        match lint_source::<R>(example.configuration, &code) {
            Ok(report) if report.violations.is_empty() && report.rule_errors.is_empty() => {}
            Ok(report) => failures.push(ExampleFailure {
                check: Check::NonTriggering,
                message: format!("expected no violations, got {}", summarize(&report)),
                code,
            }),
            Err(message) => failures.push(ExampleFailure {
                check: Check::NonTriggering,
                code,
                message,
            }),
        }
    }

    for example in description.triggering_examples {
        if let Some(failure) = check_triggering::<R>(example) {
            failures.push(failure);
        }

        let (code, _) = example.strip_markers();
        let disabled = format!("// lintel:disable {}\n{code}", description.identifier);
        match lint_source::<R>(example.configuration, &disabled) {
            Ok(report) if report.violations.is_empty() => {}
            Ok(report) => failures.push(ExampleFailure {
                check: Check::DisableCommand,
                message: format!("expected no violations, got {}", summarize(&report)),
                code: disabled,
            }),
            Err(message) => failures.push(ExampleFailure {
                check: Check::DisableCommand,
                code: disabled,
                message,
            }),
        }
    }

    for example in description.corrections {
        let (code, _) = example.input.strip_markers();
        let check = match correct_source::<R>(example.input.configuration, &code) {
            Ok((output, _)) if output != example.expected => Err(format!(
                "expected correction {:?}, got {:?}",
                example.expected, output
            )),
            Ok((_, report)) if !report.pending_corrections().is_empty() => Err(format!(
                "corrected text still has {} correction(s)",
                report.pending_corrections().len()
            )),
            Ok(_) => Ok(()),
            Err(message) => Err(message),
        };
        if let Err(message) = check {
            failures.push(ExampleFailure {
                check: Check::Correction,
                code,
                message,
            });
        }
    }

    failures
}

fn check_triggering<R: ConfigurableRule>(example: &Example) -> Option<ExampleFailure> {
    let (code, mut expected) = example.strip_markers();
    let report = match lint_source::<R>(example.configuration, &code) {
        Ok(report) => report,
        Err(message) => {
            return Some(ExampleFailure {
                check: Check::Triggering,
                code,
                message,
            })
        }
    };
    let mut actual: Vec<AbsolutePosition> = report.violations.iter().map(|v| v.position()).collect();
    actual.sort();
    expected.sort();
    if actual == expected && report.rule_errors.is_empty() {
        return None;
    }
    Some(ExampleFailure {
        check: Check::Triggering,
        message: format!(
            "expected violations at {:?}, got {}",
            offsets(&expected),
            summarize(&report)
        ),
        code: mark(&code, &actual),
    })
}

/// Lints `source` with `R` bound to the TOML `configuration`.
///
/// # Errors
///
/// Returns a message when the configuration or the source is rejected.
pub fn lint_source<R: ConfigurableRule>(
    configuration: Option<&str>,
    source: &str,
) -> Result<FileReport, String> {
    let linter = linter_for::<R>(configuration)?;
    let file = LintFile::from_source(source).map_err(|e| e.to_string())?;
    Ok(linter.lint(&file))
}

/// Corrects `source` with `R` to a fixpoint and returns the text and the
/// report of the final pass.
///
/// # Errors
///
/// Returns a message when the configuration or the source is rejected.
pub fn correct_source<R: ConfigurableRule>(
    configuration: Option<&str>,
    source: &str,
) -> Result<(String, FileReport), String> {
    let linter = linter_for::<R>(configuration)?;
    let file = LintFile::from_source(source).map_err(|e| e.to_string())?;
    let corrected = linter.correct(file);
    Ok((corrected.file.source().to_string(), corrected.report))
}

fn linter_for<R: ConfigurableRule>(configuration: Option<&str>) -> Result<Linter, String> {
    let payload: toml::Table = match configuration {
        Some(text) => text.parse().map_err(|e: toml::de::Error| e.to_string())?,
        None => toml::Table::new(),
    };
    let rule = R::from_payload(&payload).map_err(|e| e.to_string())?;
    Ok(Linter::new([ActiveRule::new(Box::new(rule))]))
}

fn summarize(report: &FileReport) -> String {
    let mut parts: Vec<String> = report
        .violations
        .iter()
        .map(|v| format!("{} ({})", v.location.offset, v.reason))
        .collect();
    parts.extend(report.rule_errors.iter().map(ToString::to_string));
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(", ")
    }
}

fn offsets(positions: &[AbsolutePosition]) -> Vec<usize> {
    positions.iter().map(|p| p.offset()).collect()
}

/// Re-inserts markers at `positions` so a failure shows where violations landed.
fn mark(code: &str, positions: &[AbsolutePosition]) -> String {
    let mut marked = String::with_capacity(code.len() + positions.len() * 3);
    let mut cursor = 0;
    for position in positions {
        let offset = position.offset().min(code.len());
        if offset < cursor || !code.is_char_boundary(offset) {
            continue;
        }
        marked.push_str(&code[cursor..offset]);
        marked.push(crate::description::VIOLATION_MARKER);
        cursor = offset;
    }
    marked.push_str(&code[cursor..]);
    marked
}

/// Strips markers from `code`; convenient in rule unit tests.
#[must_use]
pub fn unmarked(code: &str) -> String {
    strip_markers(code).0
}
