//! Shared output formatting for lint results.

use anyhow::Result;
use lintel_core::{LintResult, Severity, StyleViolation, ViolationDiagnostic};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
    }
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        println!("{} {}", violation.location, violation.rule_name);
        println!(
            "  {}: {} ({})",
            severity_indicator(violation.severity),
            violation.reason,
            violation.rule_id
        );
        if violation.correction.is_some() {
            println!("  = help: run `lintel correct` to fix");
        }
        println!();
    }
    print_corrections_and_errors(result);
    print_summary(result);
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
    print_corrections_and_errors(result);
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_pretty(result: &LintResult, root: &Path) {
    let mut sources: BTreeMap<PathBuf, Option<String>> = BTreeMap::new();
    for violation in &result.violations {
        let diagnostic = diagnostic(violation, root, &mut sources);
        println!("{:?}", miette::Report::new(diagnostic));
    }
    print_corrections_and_errors(result);
    print_summary(result);
}

/// Builds a diagnostic with the file contents attached when readable.
fn diagnostic(
    violation: &StyleViolation,
    root: &Path,
    sources: &mut BTreeMap<PathBuf, Option<String>>,
) -> ViolationDiagnostic {
    let diagnostic = ViolationDiagnostic::from(violation);
    let Some(file) = &violation.location.file else {
        return diagnostic;
    };
    let source = sources
        .entry(file.clone())
        .or_insert_with(|| std::fs::read_to_string(root.join(file)).ok());
    match source {
        Some(source) => diagnostic.with_source(file.display().to_string(), source.clone()),
        None => diagnostic,
    }
}

fn print_corrections_and_errors(result: &LintResult) {
    for record in &result.corrections {
        println!("{record}");
    }
    for error in &result.file_errors {
        eprintln!(
            "{}: {}: {}",
            severity_indicator(Severity::Error),
            error.file.display(),
            error.message
        );
    }
    for error in &result.rule_errors {
        eprintln!("{}: {error}", severity_indicator(Severity::Warning));
    }
}

fn print_summary(result: &LintResult) {
    let (errors, warnings) = result.count_by_severity();
    let summary_color = if errors > 0 || !result.file_errors.is_empty() {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!("{summary_color}{}\x1b[0m", result.summary());
}
