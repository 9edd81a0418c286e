//! Runs a set of rules over one file.

use crate::context::LintFile;
use crate::correction::{CorrectionEngine, DroppedCorrection, PendingCorrection};
use crate::error::RuleExecutionError;
use crate::regions::InvalidCommand;
use crate::rule::RuleBox;
use crate::types::{CorrectionRecord, ReasonedViolation, Severity, StyleViolation};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

/// Upper bound on lint-and-correct passes over one file.
pub const MAX_CORRECTION_PASSES: usize = 10;

/// A configured rule plus an optional severity override.
pub struct ActiveRule {
    /// The rule instance.
    pub rule: RuleBox,
    /// Replaces every severity the rule reports.
    pub severity_override: Option<Severity>,
}

impl ActiveRule {
    /// Wraps `rule` with no override.
    #[must_use]
    pub fn new(rule: RuleBox) -> Self {
        Self {
            rule,
            severity_override: None,
        }
    }

    /// Forces every violation of this rule to `severity`.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity_override = Some(severity);
        self
    }

    /// The rule identifier.
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        self.rule.identifier()
    }

    fn resolve(&self, file: &LintFile, violation: ReasonedViolation) -> StyleViolation {
        let description = self.rule.description();
        let severity = self
            .severity_override
            .or(violation.severity)
            .unwrap_or_else(|| self.rule.severity());
        StyleViolation {
            rule_id: description.identifier.to_string(),
            rule_name: description.name.to_string(),
            severity,
            location: file.location(violation.position),
            reason: violation
                .reason
                .unwrap_or_else(|| description.description.to_string()),
            correction: violation.correction,
        }
    }
}

impl std::fmt::Debug for ActiveRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRule")
            .field("identifier", &self.identifier())
            .field("severity_override", &self.severity_override)
            .finish()
    }
}

impl From<RuleBox> for ActiveRule {
    fn from(rule: RuleBox) -> Self {
        Self::new(rule)
    }
}

/// Everything one lint pass found in one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    /// Violations sorted by position, then rule identifier.
    pub violations: Vec<StyleViolation>,
    /// Rules that failed on this file.
    pub rule_errors: Vec<RuleExecutionError>,
    /// Comment commands that were ignored.
    pub invalid_commands: Vec<InvalidCommand>,
}

impl FileReport {
    /// Corrections of all violations, tagged with their rule.
    #[must_use]
    pub fn pending_corrections(&self) -> Vec<PendingCorrection> {
        self.violations
            .iter()
            .filter_map(|v| {
                v.correction
                    .clone()
                    .map(|c| PendingCorrection::new(v.rule_id.clone(), c))
            })
            .collect()
    }
}

/// Result of [`Linter::correct`].
#[derive(Debug)]
pub struct CorrectedFile {
    /// The file after the last successful pass.
    pub file: LintFile,
    /// Lint report of the final text.
    pub report: FileReport,
    /// Applied corrections, pass by pass.
    pub corrections: Vec<CorrectionRecord>,
    /// Corrections the engine refused.
    pub dropped: Vec<DroppedCorrection>,
    /// Passes that changed the text.
    pub passes: usize,
}

impl CorrectedFile {
    /// Whether any pass changed the text.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.passes > 0
    }
}

/// Runs an ordered, deduplicated list of rules over files.
#[derive(Debug, Default)]
pub struct Linter {
    rules: Vec<ActiveRule>,
}

impl Linter {
    /// Creates a linter. A rule whose identifier already appeared is dropped.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = ActiveRule>) -> Self {
        let mut unique: Vec<ActiveRule> = Vec::new();
        for active in rules {
            if unique.iter().any(|r| r.identifier() == active.identifier()) {
                warn!(rule = active.identifier(), "rule listed twice, keeping the first");
                continue;
            }
            unique.push(active);
        }
        Self { rules: unique }
    }

    /// The active rules in run order.
    #[must_use]
    pub fn rules(&self) -> &[ActiveRule] {
        &self.rules
    }

    /// Number of active rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Lints `file` with every active rule.
    ///
    /// A rule that fails or panics is recorded in
    /// [`FileReport::rule_errors`] and the remaining rules still run.
    #[must_use]
    pub fn lint(&self, file: &LintFile) -> FileReport {
        debug!(file = ?file.path(), rules = self.rules.len(), "linting");
        let mut report = FileReport {
            invalid_commands: file.regions().invalid_commands().to_vec(),
            ..FileReport::default()
        };

        for active in &self.rules {
            match run_isolated(active, file) {
                Ok(found) => {
                    let ids = active.rule.description().all_identifiers();
                    report.violations.extend(
                        found
                            .into_iter()
                            .filter(|v| !file.regions().is_any_disabled(&ids, v.position))
                            .map(|v| active.resolve(file, v)),
                    );
                }
                Err(error) => {
                    warn!(rule = %error.rule_id, file = ?file.path(), "{}", error.message);
                    report
                        .rule_errors
                        .push(error.in_file(file.path().map(Path::to_path_buf)));
                }
            }
        }

        report.violations.sort_by(|a, b| {
            a.location
                .offset
                .cmp(&b.location.offset)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });
        report
    }

    /// Lints and corrects `file` until no correction applies or
    /// [`MAX_CORRECTION_PASSES`] passes ran.
    ///
    /// Each pass applies the non-conflicting corrections of one lint run
    /// and re-parses the result. A pass whose output no longer parses is
    /// discarded.
    #[must_use]
    pub fn correct(&self, file: LintFile) -> CorrectedFile {
        let mut current = file;
        let mut corrections = Vec::new();
        let mut dropped = Vec::new();
        let mut passes = 0;

        for pass in 1..=MAX_CORRECTION_PASSES {
            let pending = self.lint(&current).pending_corrections();
            if pending.is_empty() {
                break;
            }
            let outcome = CorrectionEngine::new(current.regions()).apply(current.source(), pending);
            dropped.extend(outcome.dropped);
            if outcome.output == current.source() {
                break;
            }

            let next = match LintFile::parse(current.path().map(Path::to_path_buf), outcome.output)
            {
                Ok(next) => next,
                Err(failure) => {
                    warn!(
                        file = ?current.path(),
                        pass,
                        %failure,
                        "corrected text does not parse, keeping previous pass"
                    );
                    break;
                }
            };
            corrections.extend(outcome.applied.iter().map(|applied| CorrectionRecord {
                rule_id: applied.rule_id.clone(),
                location: current.location(applied.start()),
                description: self.describe(&applied.rule_id),
            }));
            debug!(
                file = ?current.path(),
                pass,
                applied = outcome.applied.len(),
                "correction pass"
            );
            current = next;
            passes = pass;
        }

        if passes == MAX_CORRECTION_PASSES {
            warn!(
                file = ?current.path(),
                "corrections did not settle after {MAX_CORRECTION_PASSES} passes"
            );
        }

        let report = self.lint(&current);
        CorrectedFile {
            file: current,
            report,
            corrections,
            dropped,
            passes,
        }
    }

    fn describe(&self, rule_id: &str) -> String {
        self.rules
            .iter()
            .find(|r| r.identifier() == rule_id)
            .map(|r| r.rule.description().description.to_string())
            .unwrap_or_default()
    }
}

fn run_isolated(
    active: &ActiveRule,
    file: &LintFile,
) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
    debug!(rule = active.identifier(), "running rule");
    match panic::catch_unwind(AssertUnwindSafe(|| active.rule.validate(file))) {
        Ok(result) => result,
        Err(payload) => Err(RuleExecutionError::new(
            active.identifier(),
            format!("panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::SeverityConfiguration;
    use crate::description::{RuleDescription, RuleKind};
    use crate::rule::{ConfigurableRule, Rule, RuleVisitor};
    use crate::syntax::ast::{self, AstNode};
    use crate::types::Correction;
    use crate::visitor::{SyntaxVisitor, VisitAction};

    /// Flags whitespace between a callee and `(` and removes it.
    struct TightCalls(SeverityConfiguration);

    struct TightCallsVisitor(Vec<ReasonedViolation>);

    impl SyntaxVisitor for TightCallsVisitor {
        fn visit_function_call_expr(&mut self, node: ast::FunctionCallExpr<'_>) -> VisitAction {
            let (Some(callee), Some(paren)) = (node.called_expression(), node.left_paren()) else {
                return VisitAction::VisitChildren;
            };
            let gap_start = callee.end_position_before_trailing_trivia();
            let gap_end = paren.position_after_leading_trivia();
            if gap_start < gap_end {
                self.0.push(
                    ReasonedViolation::new(gap_start).with_correction(Correction::remove(
                        crate::position::ByteRange::new(gap_start, gap_end),
                    )),
                );
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
            deprecated_aliases: &["call_gap"],
            ..RuleDescription::new("tight_calls", "Tight Calls", "No gap before `(`", RuleKind::Style)
        };
        fn with_configuration(configuration: Self::Configuration) -> Self {
            Self(configuration)
        }
        fn configuration(&self) -> &Self::Configuration {
            &self.0
        }
    }

    /// Reports every identifier token; used to check ordering.
    struct Identifiers;

    struct IdentifiersVisitor(Vec<ReasonedViolation>);

    impl SyntaxVisitor for IdentifiersVisitor {
        fn visit_token(&mut self, token: crate::syntax::SyntaxToken<'_>) {
            if token.kind() == crate::syntax::TokenKind::Identifier {
                self.0.push(
                    ReasonedViolation::new(token.position_after_leading_trivia())
                        .with_reason(token.text())
                        .with_severity(Severity::Error),
                );
            }
        }
    }

    impl RuleVisitor for IdentifiersVisitor {
        fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
            Ok(self.0)
        }
    }

    const IDENTIFIERS: &RuleDescription =
        &RuleDescription::new("identifiers", "Identifiers", "An identifier", RuleKind::Lint);

    impl Rule for Identifiers {
        fn description(&self) -> &'static RuleDescription {
            IDENTIFIERS
        }
        fn severity(&self) -> Severity {
            Severity::Warning
        }
        fn make_visitor<'a>(&'a self, _file: &'a LintFile) -> Box<dyn RuleVisitor + 'a> {
            Box::new(IdentifiersVisitor(Vec::new()))
        }
    }

    /// Panics or fails on demand.
    struct Broken {
        panics: bool,
    }

    struct BrokenVisitor {
        panics: bool,
    }

    impl SyntaxVisitor for BrokenVisitor {
        fn visit_source_file(&mut self, _node: ast::SourceFile<'_>) -> VisitAction {
            assert!(!self.panics, "unexpected tree shape");
            VisitAction::VisitChildren
        }
    }

    impl RuleVisitor for BrokenVisitor {
        fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
            Err(RuleExecutionError::new("gives_up", "gave up"))
        }
    }

    const PANICS: &RuleDescription =
        &RuleDescription::new("panics", "Panics", "Panics while walking", RuleKind::Lint);
    const GIVES_UP: &RuleDescription =
        &RuleDescription::new("gives_up", "Gives Up", "Fails when finishing", RuleKind::Lint);

    impl Rule for Broken {
        fn description(&self) -> &'static RuleDescription {
            if self.panics {
                PANICS
            } else {
                GIVES_UP
            }
        }
        fn severity(&self) -> Severity {
            Severity::Error
        }
        fn make_visitor<'a>(&'a self, _file: &'a LintFile) -> Box<dyn RuleVisitor + 'a> {
            Box::new(BrokenVisitor {
                panics: self.panics,
            })
        }
    }

    fn tight() -> ActiveRule {
        ActiveRule::new(Box::new(TightCalls::with_defaults()))
    }

    #[test]
    fn reports_violation_with_location_and_default_reason() {
        let file = LintFile::from_source("foo ()").unwrap();
        let report = Linter::new([tight()]).lint(&file);
        assert_eq!(report.violations.len(), 1);
        let violation = &report.violations[0];
        assert_eq!(violation.location.offset, 3);
        assert_eq!(violation.location.column, 4);
        assert_eq!(violation.reason, "No gap before `(`");
        assert_eq!(violation.severity, Severity::Warning);
    }

    #[test]
    fn clean_input_has_no_violations() {
        let file = LintFile::from_source("foo()").unwrap();
        assert!(Linter::new([tight()]).lint(&file).violations.is_empty());
    }

    #[test]
    fn violations_are_sorted_by_position_then_rule() {
        let file = LintFile::from_source("b (a)").unwrap();
        let linter = Linter::new([ActiveRule::new(Box::new(Identifiers)), tight()]);
        let report = linter.lint(&file);
        let order: Vec<_> = report
            .violations
            .iter()
            .map(|v| (v.location.offset, v.rule_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(0, "identifiers"), (1, "tight_calls"), (3, "identifiers")]
        );
    }

    #[test]
    fn violation_severity_and_override() {
        let file = LintFile::from_source("x").unwrap();
        let report = Linter::new([ActiveRule::new(Box::new(Identifiers))]).lint(&file);
        assert_eq!(report.violations[0].severity, Severity::Error);

        let overridden =
            Linter::new([ActiveRule::new(Box::new(Identifiers)).with_severity(Severity::Warning)]);
        assert_eq!(overridden.lint(&file).violations[0].severity, Severity::Warning);
    }

    #[test]
    fn failing_rules_are_isolated() {
        let file = LintFile::parse(Some("A.swift".into()), "foo ()").unwrap();
        let linter = Linter::new([
            ActiveRule::new(Box::new(Broken { panics: true })),
            tight(),
            ActiveRule::new(Box::new(Broken { panics: false })),
        ]);
        assert_eq!(linter.len(), 3);
        let report = linter.lint(&file);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].rule_id, "tight_calls");

        let errors: Vec<_> = report.rule_errors.iter().map(|e| e.rule_id.as_str()).collect();
        assert_eq!(errors, vec!["panics", "gives_up"]);
        assert!(report.rule_errors[0].message.contains("unexpected tree shape"));
        assert_eq!(report.rule_errors[1].message, "gave up");
        for error in &report.rule_errors {
            assert_eq!(error.file.as_deref(), Some(Path::new("A.swift")));
        }
    }

    #[test]
    fn disabled_regions_apply_to_aliases() {
        let file = LintFile::from_source("// lintel:disable:next call_gap\nfoo ()\nbar ()").unwrap();
        let report = Linter::new([tight()]).lint(&file);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].location.line, 3);
    }

    #[test]
    fn invalid_commands_are_reported() {
        let file = LintFile::from_source("// lintel:frobnicate all\nfoo()").unwrap();
        let report = Linter::new([tight()]).lint(&file);
        assert_eq!(report.invalid_commands.len(), 1);
    }

    #[test]
    fn duplicate_rules_are_dropped() {
        let linter = Linter::new([tight(), tight()]);
        assert_eq!(linter.len(), 1);
    }

    #[test]
    fn correct_reaches_a_fixpoint() {
        let file = LintFile::from_source("foo ()\nbar  (baz ())\n").unwrap();
        let corrected = Linter::new([tight()]).correct(file);
        assert_eq!(corrected.file.source(), "foo()\nbar(baz())\n");
        assert!(corrected.changed());
        assert_eq!(corrected.passes, 1);
        assert!(corrected.report.violations.is_empty());
        let lines: Vec<_> = corrected
            .corrections
            .iter()
            .map(|c| (c.location.line, c.location.column))
            .collect();
        assert_eq!(lines, vec![(1, 4), (2, 4), (2, 10)]);
    }

    #[test]
    fn correct_leaves_clean_files_untouched() {
        let file = LintFile::from_source("foo()").unwrap();
        let corrected = Linter::new([tight()]).correct(file);
        assert!(!corrected.changed());
        assert!(corrected.corrections.is_empty());
        assert_eq!(corrected.file.source(), "foo()");
    }

    #[test]
    fn correct_skips_disabled_regions() {
        let source = "// lintel:disable tight_calls\nfoo ()\n// lintel:enable tight_calls\nbar ()\n";
        let corrected = Linter::new([tight()]).correct(LintFile::from_source(source).unwrap());
        assert_eq!(
            corrected.file.source(),
            "// lintel:disable tight_calls\nfoo ()\n// lintel:enable tight_calls\nbar()\n"
        );
    }

    #[test]
    fn repeated_runs_are_identical() {
        let file = LintFile::from_source("a (b) . c (d ())").unwrap();
        let linter = Linter::new([ActiveRule::new(Box::new(Identifiers)), tight()]);
        assert_eq!(linter.lint(&file).violations, linter.lint(&file).violations);
    }
}
