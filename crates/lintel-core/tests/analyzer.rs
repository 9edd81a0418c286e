//! Integration test: discovery, parallel linting and write-back via Analyzer.

use lintel_core::ast::{self, AstNode};
use lintel_core::{
    ActiveRule, Analyzer, ByteRange, Config, ConfigurableRule, Correction, LintFile, Linter,
    ReasonedViolation, Rule, RuleDescription, RuleExecutionError, RuleKind, RuleVisitor,
    Severity, SeverityConfiguration, SyntaxVisitor, VisitAction,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct TightCalls(SeverityConfiguration);

struct TightCallsVisitor(Vec<ReasonedViolation>);

impl SyntaxVisitor for TightCallsVisitor {
    fn visit_function_call_expr(&mut self, node: ast::FunctionCallExpr<'_>) -> VisitAction {
        if let (Some(callee), Some(paren)) = (node.called_expression(), node.left_paren()) {
            let gap = ByteRange::new(
                callee.end_position_before_trailing_trivia(),
                paren.position_after_leading_trivia(),
            );
            if !gap.is_empty() && !node.syntax().is_missing() {
                self.0
                    .push(ReasonedViolation::new(gap.start).with_correction(Correction::remove(gap)));
            }
        }
        VisitAction::VisitChildren
    }
}

impl RuleVisitor for TightCallsVisitor {
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        Ok(self.0)
    }
}

impl Rule for TightCalls {
    fn description(&self) -> &'static RuleDescription {
        Self::DESCRIPTION
    }

    fn severity(&self) -> Severity {
        self.0.severity
    }

    fn make_visitor<'a>(&'a self, _file: &'a LintFile) -> Box<dyn RuleVisitor + 'a> {
        Box::new(TightCallsVisitor(Vec::new()))
    }
}

impl ConfigurableRule for TightCalls {
    type Configuration = SeverityConfiguration;
    const DESCRIPTION: &'static RuleDescription = &RuleDescription {
        correctable: true,
        ..RuleDescription::new("tight_calls", "Tight Calls", "No gap before `(`", RuleKind::Style)
    };

    fn with_configuration(configuration: Self::Configuration) -> Self {
        Self(configuration)
    }

    fn configuration(&self) -> &Self::Configuration {
        &self.0
    }
}

fn linter(severity: Severity) -> Linter {
    Linter::new([ActiveRule::new(Box::new(TightCalls::with_defaults())).with_severity(severity)])
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, content).expect("write fixture");
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "Sources/B.swift", "bar ()\n");
    write(root, "Sources/A.swift", "foo()\nfoo ()\n");
    write(root, "Sources/Clean.swift", "ok()\n");
    write(root, "Sources/notes.md", "foo ()\n");
    write(root, ".build/debug/Gen.swift", "gen ()\n");
    write(root, "Ignored/X.swift", "x ()\n");
    write(root, ".gitignore", "Ignored/\n");
    dir
}

fn analyzer(root: &Path, severity: Severity) -> Analyzer {
    Analyzer::builder()
        .root(root)
        .linter(linter(severity))
        .build()
        .expect("analyzer should build")
}

#[test]
fn lints_matching_files_sorted_by_path() {
    let dir = project();
    let result = analyzer(dir.path(), Severity::Warning)
        .analyze()
        .expect("analysis should succeed");

    assert_eq!(result.files_checked, 3);
    let found: Vec<String> = result.violations.iter().map(|v| v.location.to_string()).collect();
    assert_eq!(found, vec!["Sources/A.swift:2:4", "Sources/B.swift:1:4"]);
    assert!(!result.is_failure());
}

#[test]
fn error_severity_fails_the_run() {
    let dir = project();
    let result = analyzer(dir.path(), Severity::Error).analyze().expect("analysis");
    assert!(result.is_failure());
    assert_eq!(result.count_by_severity(), (2, 0));
}

#[test]
fn parse_failures_are_file_errors() {
    let dir = project();
    write(dir.path(), "Sources/Broken.swift", "let s = \"unterminated\n");
    let result = analyzer(dir.path(), Severity::Warning).analyze().expect("analysis");

    assert_eq!(result.files_checked, 3);
    assert_eq!(result.file_errors.len(), 1);
    assert_eq!(result.file_errors[0].file, Path::new("Sources/Broken.swift"));
    assert_eq!(result.violations.len(), 2);
    assert!(result.is_failure());
}

#[test]
fn deeply_nested_files_fail_alone() {
    let dir = project();
    let depth = 5000;
    let nested = format!("let x = {}1{}\n", "[".repeat(depth), "]".repeat(depth));
    write(dir.path(), "Sources/Deep.swift", &nested);
    let result = analyzer(dir.path(), Severity::Warning).analyze().expect("analysis");

    assert_eq!(result.file_errors.len(), 1);
    assert_eq!(result.file_errors[0].file, Path::new("Sources/Deep.swift"));
    assert!(result.file_errors[0].message.contains("nesting exceeds"));
    assert_eq!(result.files_checked, 3);
    assert_eq!(result.violations.len(), 2);
}

#[test]
fn invalid_commands_are_skipped() {
    let dir = project();
    write(dir.path(), "Sources/C.swift", "// lintel:frobnicate colon\ncall ()\n");
    let result = analyzer(dir.path(), Severity::Warning).analyze().expect("analysis");

    assert_eq!(result.files_checked, 4);
    let found: Vec<String> = result.violations.iter().map(|v| v.location.to_string()).collect();
    assert_eq!(
        found,
        vec!["Sources/A.swift:2:4", "Sources/B.swift:1:4", "Sources/C.swift:2:5"]
    );
}

#[test]
fn correct_rewrites_only_changed_files() {
    let dir = project();
    let result = analyzer(dir.path(), Severity::Warning).correct().expect("correction");

    let read = |relative: &str| fs::read_to_string(dir.path().join(relative)).expect("read back");
    assert_eq!(read("Sources/A.swift"), "foo()\nfoo()\n");
    assert_eq!(read("Sources/B.swift"), "bar()\n");
    assert_eq!(read("Sources/Clean.swift"), "ok()\n");
    assert_eq!(read("Ignored/X.swift"), "x ()\n");

    assert!(result.violations.is_empty());
    let corrected: Vec<String> = result.corrections.iter().map(|c| c.location.to_string()).collect();
    assert_eq!(corrected, vec!["Sources/A.swift:2:4", "Sources/B.swift:1:4"]);
}

#[test]
fn configuration_patterns_and_explicit_paths() {
    let dir = project();
    let config = Config::parse("[analyzer]\nexclude = [\"**/B.swift\"]\n").expect("config");
    let result = Analyzer::builder()
        .root(dir.path())
        .config(config)
        .linter(linter(Severity::Warning))
        .build()
        .expect("build")
        .analyze()
        .expect("analysis");
    assert_eq!(result.files_checked, 2);

    let only_b = Analyzer::builder()
        .root(dir.path())
        .paths(["Sources/B.swift"])
        .linter(linter(Severity::Warning))
        .build()
        .expect("build")
        .analyze()
        .expect("analysis");
    assert_eq!(only_b.files_checked, 1);
    assert_eq!(only_b.violations.len(), 1);
}

#[test]
fn results_do_not_depend_on_parallelism() {
    let dir = project();
    for i in 0..16 {
        write(dir.path(), &format!("Sources/Many/F{i:02}.swift"), "a (b (c ()))\n");
    }
    let run = |threads: usize| {
        Analyzer::builder()
            .root(dir.path())
            .linter(linter(Severity::Warning))
            .parallelism(threads)
            .build()
            .expect("build")
            .analyze()
            .expect("analysis")
            .violations
    };
    assert_eq!(run(1), run(4));
}
