//! Engine properties checked against the built-in rules over a small corpus.

use lintel_core::{
    AbsolutePosition, Config, CorrectionEngine, LintFile, Linter, MAX_CORRECTION_PASSES,
};
use lintel_rules::builtin_registry;

const CORPUS: &[&str] = &[
    "",
    "foo()\n",
    "foo ()  .bar ()\n",
    "import ZZZ\nimport AAA\n\nlet value:Int = compute (1)  \n",
    "class Outer {\n    class Inner {\n        class Deepest {}\n    }\n}\n",
    "var name: String? = nil\nvar count : Int?  = nil \n",
    "func Make(width:Int, height :Int) -> Int {\n    return width . multiplied (by: height)\n}\n",
    "let dict = [\"a\" : 1, \"b\":2]\nlet empty: [String: Int] = [:]\n",
    "// lintel:disable function_call_spacing\nfoo ()\n// lintel:enable function_call_spacing\nbar ()\n",
    "let café = \"naïve\"   \nlet x = 1\r\nlet y = 2 \r\n",
    "/* note */ let a = \"\"\"\n  keep  \n  \"\"\"   \n",
    "enum Color { case Red, green }\nstruct S { static let Shared = S() }\n",
    "func f() { func g() { func h() { func i() { call (x) } } } }\n",
];

fn all_rules() -> Linter {
    let config = Config {
        opt_in_rules: vec!["sorted_imports".to_string()],
        ..Config::default()
    };
    let resolution = config.resolve(&builtin_registry());
    assert!(resolution.issues.is_empty(), "{:?}", resolution.issues);
    resolution.into_linter()
}

fn default_rules() -> Linter {
    Config::default().resolve(&builtin_registry()).into_linter()
}

fn parse(source: &str) -> LintFile {
    LintFile::from_source(source).unwrap()
}

#[test]
fn trees_reproduce_their_source() {
    for source in CORPUS {
        assert_eq!(parse(source).tree().text(), *source);
    }
}

#[test]
fn linting_is_deterministic() {
    let linter = all_rules();
    for source in CORPUS {
        let file = parse(source);
        let first = linter.lint(&file).violations;
        let second = linter.lint(&parse(source)).violations;
        assert_eq!(first, second, "{source:?}");
    }
}

#[test]
fn violation_positions_are_valid() {
    let linter = all_rules();
    for source in CORPUS {
        let file = parse(source);
        for violation in linter.lint(&file).violations {
            let offset = violation.location.offset;
            assert!(offset <= source.len(), "{violation}");
            assert!(source.is_char_boundary(offset), "{violation}");
            let expected = file.line_column(AbsolutePosition(offset));
            assert_eq!(
                (violation.location.line, violation.location.column),
                (expected.line, expected.column),
                "{violation}"
            );
        }
    }
}

#[test]
fn applied_corrections_never_overlap() {
    let linter = all_rules();
    for source in CORPUS {
        let file = parse(source);
        let pending = linter.lint(&file).pending_corrections();
        let outcome = CorrectionEngine::new(file.regions()).apply(source, pending);
        for pair in outcome.applied.windows(2) {
            assert!(pair[0].end() <= pair[1].start(), "{source:?}: {pair:?}");
        }
    }
}

#[test]
fn correction_reaches_a_fixpoint() {
    let linter = all_rules();
    for source in CORPUS {
        let corrected = linter.correct(parse(source));
        assert!(corrected.passes < MAX_CORRECTION_PASSES, "{source:?}");
        assert!(corrected.report.pending_corrections().is_empty(), "{source:?}");

        let again = linter.correct(parse(corrected.file.source()));
        assert!(!again.changed(), "{source:?}");
    }
}

#[test]
fn corrected_output_parses_and_keeps_uncorrectable_findings() {
    let linter = all_rules();
    let corrected = linter.correct(parse(CORPUS[4]));
    assert_eq!(corrected.file.source(), CORPUS[4]);
    let ids: Vec<_> = corrected
        .report
        .violations
        .iter()
        .map(|v| v.rule_id.as_str())
        .collect();
    assert_eq!(ids, vec!["nesting"]);
}

#[test]
fn single_call_gap() {
    let report = default_rules().lint(&parse("foo ()"));
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.rule_id, "function_call_spacing");
    assert_eq!(violation.location.offset, 3);

    let corrected = default_rules().correct(parse("foo ()"));
    assert_eq!(corrected.file.source(), "foo()");
    assert_eq!(corrected.corrections.len(), 1);
}

#[test]
fn tight_call_is_clean() {
    assert!(default_rules().lint(&parse("foo()")).violations.is_empty());
}

#[test]
fn call_and_member_gaps_are_fixed_together() {
    let corrected = default_rules().correct(parse("foo ()  .bar ()"));
    assert_eq!(corrected.file.source(), "foo().bar()");
    assert!(corrected.report.violations.is_empty());
}

#[test]
fn opt_in_rules_are_off_by_default() {
    let source = "import BBB\nimport AAA\n";
    assert!(default_rules().lint(&parse(source)).violations.is_empty());
    let report = all_rules().lint(&parse(source));
    assert_eq!(report.violations[0].rule_id, "sorted_imports");
}

#[test]
fn disabled_regions_suppress_findings_and_fixes() {
    let source = CORPUS[8];
    let linter = default_rules();
    let report = linter.lint(&parse(source));
    let lines: Vec<_> = report.violations.iter().map(|v| v.location.line).collect();
    assert_eq!(lines, vec![4]);

    let corrected = linter.correct(parse(source));
    assert_eq!(
        corrected.file.source(),
        "// lintel:disable function_call_spacing\nfoo ()\n// lintel:enable function_call_spacing\nbar()\n"
    );
}

#[test]
fn deprecated_alias_configures_the_rule() {
    let config = Config::parse("[rules.variable_name]\nexcluded = [\"x\"]\n").unwrap();
    let linter = config.resolve(&builtin_registry()).into_linter();
    let report = linter.lint(&parse("let x = 1\nlet y = 2\n"));
    let lines: Vec<_> = report
        .violations
        .iter()
        .filter(|v| v.rule_id == "identifier_name")
        .map(|v| v.location.line)
        .collect();
    assert_eq!(lines, vec![2]);
}
