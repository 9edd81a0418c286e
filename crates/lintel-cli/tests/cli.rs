//! End-to-end runs of the `lintel` binary against temporary projects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn lintel(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lintel"))
        .args(args)
        .current_dir(dir)
        .env("LINTEL_CONFIG_DIR", dir.join(".no-global"))
        .env_remove("LINTEL_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run lintel")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = tmp.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    tmp
}

#[test]
fn clean_project_exits_zero() {
    let tmp = project(&[("Sources/App.swift", "foo()\n")]);
    let output = lintel(tmp.path(), &["lint"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Found 0 error(s), 0 warning(s) in 1 file(s)"));
}

#[test]
fn compact_output_lists_violations() {
    let tmp = project(&[("Sources/App.swift", "foo ()\n"), ("README.md", "foo ()\n")]);
    let output = lintel(tmp.path(), &["lint", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "Sources/App.swift:1:4: warning [function_call_spacing] There should be no space between a function name and the opening parenthesis\n"
    );
}

#[test]
fn strict_fails_on_warnings() {
    let tmp = project(&[("App.swift", "foo ()\n")]);
    assert_eq!(lintel(tmp.path(), &["lint", "--strict"]).status.code(), Some(1));
}

#[test]
fn error_severity_fails_the_run() {
    let tmp = project(&[
        ("App.swift", "foo ()\n"),
        (
            "lintel.toml",
            "[rules.function_call_spacing]\nseverity = \"error\"\n",
        ),
    ]);
    assert_eq!(lintel(tmp.path(), &["lint"]).status.code(), Some(1));
}

#[test]
fn correct_rewrites_files() {
    let tmp = project(&[("App.swift", "foo ()  .bar ()\nlet value:Int = 1  \n")]);
    let output = lintel(tmp.path(), &["correct", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(tmp.path().join("App.swift")).unwrap(),
        "foo().bar()\nlet value: Int = 1\n"
    );
    assert!(stdout(&output).contains("corrected [function_call_spacing]"));
}

#[test]
fn fix_is_an_alias_for_correct() {
    let tmp = project(&[("App.swift", "foo ()\n")]);
    lintel(tmp.path(), &["fix"]);
    assert_eq!(fs::read_to_string(tmp.path().join("App.swift")).unwrap(), "foo()\n");
}

#[test]
fn rules_filter_limits_the_run() {
    let tmp = project(&[("App.swift", "foo ()\nlet x = 1  \n")]);
    let output = lintel(
        tmp.path(),
        &["lint", "--format", "json", "--rules", "trailing_whitespace"],
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = json["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["rule_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["trailing_whitespace"]);
    assert_eq!(json["files_checked"], 1);
}

#[test]
fn unparsable_files_fail_the_run() {
    let tmp = project(&[("Broken.swift", "let s = \"unterminated\n")]);
    assert_eq!(lintel(tmp.path(), &["lint"]).status.code(), Some(1));
}

#[test]
fn invalid_config_is_fatal() {
    let tmp = project(&[("App.swift", "foo()\n"), ("lintel.toml", "not toml at all [")]);
    let output = lintel(tmp.path(), &["lint"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to load config"));
}

#[test]
fn rules_lists_every_rule() {
    let tmp = TempDir::new().unwrap();
    let output = lintel(tmp.path(), &["rules"]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    for id in ["colon", "nesting", "sorted_imports", "identifier_name"] {
        assert!(text.contains(id), "{id} missing from:\n{text}");
    }
}

#[test]
fn init_writes_a_usable_config() {
    let tmp = project(&[("App.swift", "import B\nimport A\n")]);
    assert_eq!(lintel(tmp.path(), &["init"]).status.code(), Some(0));
    assert!(tmp.path().join("lintel.toml").exists());
    assert_eq!(lintel(tmp.path(), &["init"]).status.code(), Some(2));

    let output = lintel(tmp.path(), &["lint", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("[sorted_imports]"));
}

#[test]
fn config_is_found_from_a_subdirectory() {
    let tmp = project(&[
        (".git/HEAD", "ref: refs/heads/main\n"),
        ("lintel.toml", "opt_in_rules = [\"sorted_imports\"]\n"),
        ("Sources/App/A.swift", "import B\nimport A\n"),
        ("Other.swift", "import D\nimport C\n"),
    ]);
    let output = lintel(&tmp.path().join("Sources/App"), &["lint", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Sources/App/A.swift:2:8: warning [sorted_imports]"), "{text}");
    assert!(!text.contains("Other.swift"), "{text}");
}
