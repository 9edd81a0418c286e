//! Rule for identifier naming.
//!
//! # Rationale
//!
//! Names of variables, functions and enum cases start with a lowercase
//! character (or are all caps), stay alphanumeric, and are neither cryptic
//! nor sprawling.
//!
//! # Detected Patterns
//!
//! - Names containing symbols other than letters, digits or `allowed_symbols`
//! - Variable and enum case names shorter or longer than the thresholds
//! - Names starting with an uppercase letter followed by a lowercase one
//!
//! Function names are only checked for case. `static` and `class` variables
//! may start with an uppercase letter. Overrides are never checked, since
//! the name is chosen elsewhere.
//!
//! # Configuration
//!
//! - `min_length`: `{ warning = 3, error = 2 }`
//! - `max_length`: `{ warning = 40, error = 60 }`
//! - `excluded`: names that are never reported (default: `["id"]`)
//! - `allowed_symbols`: extra characters accepted in names (default: none)
//! - `unallowed_symbols_severity`: severity for disallowed symbols (default: error)
//! - `validates_start_with_lowercase`: `"off"`, `"warning"` or `"error"` (default: error)

use lintel_core::ast::{self, AstNode, DeclSyntax};
use lintel_core::syntax::{Keyword, NodeKind, SyntaxToken, TokenKind};
use lintel_core::{
    Example, LintFile, ReasonedViolation, RuleConfiguration, RuleDescription, RuleExecutionError,
    RuleKind, RuleVisitor, Severity, SeverityLevels, SyntaxVisitor, VisitAction,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether and how loudly to check the case of the first character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseCheck {
    /// Do not check.
    Off,
    /// Report as a warning.
    Warning,
    /// Report as an error.
    #[default]
    Error,
}

impl CaseCheck {
    fn severity(self) -> Option<Severity> {
        match self {
            Self::Off => None,
            Self::Warning => Some(Severity::Warning),
            Self::Error => Some(Severity::Error),
        }
    }
}

/// Configuration for [`IdentifierNameRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IdentifierNameConfiguration {
    /// Shortest acceptable name.
    pub min_length: SeverityLevels,
    /// Longest acceptable name.
    pub max_length: SeverityLevels,
    /// Names that are never reported.
    pub excluded: Vec<String>,
    /// Characters accepted besides letters and digits.
    pub allowed_symbols: Vec<String>,
    /// Severity for names with disallowed symbols.
    pub unallowed_symbols_severity: Severity,
    /// Case check of the first character.
    pub validates_start_with_lowercase: CaseCheck,
}

impl Default for IdentifierNameConfiguration {
    fn default() -> Self {
        Self {
            min_length: SeverityLevels::new(3, 2),
            max_length: SeverityLevels::new(40, 60),
            excluded: vec!["id".to_string()],
            allowed_symbols: Vec::new(),
            unallowed_symbols_severity: Severity::Error,
            validates_start_with_lowercase: CaseCheck::Error,
        }
    }
}

impl RuleConfiguration for IdentifierNameConfiguration {
    /// Every violation carries its own severity; this is only the fallback.
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn validate(&self) -> Result<(), String> {
        self.min_length.validate_as_minimum("min_length")?;
        self.max_length.validate_as_maximum("max_length")?;
        if self.min_length.warning > self.max_length.warning {
            return Err(format!(
                "'min_length' warning threshold {} is above 'max_length' warning threshold {}",
                self.min_length.warning, self.max_length.warning
            ));
        }
        if let Some(symbol) = self.allowed_symbols.iter().find(|s| s.chars().count() != 1) {
            return Err(format!(
                "'allowed_symbols' entries must be single characters, got {symbol:?}"
            ));
        }
        Ok(())
    }
}

impl IdentifierNameConfiguration {
    fn is_allowed_symbol(&self, c: char) -> bool {
        self.allowed_symbols
            .iter()
            .any(|s| s.chars().next() == Some(c))
    }

    fn contains_only_allowed_characters(&self, name: &str) -> bool {
        name.chars()
            .all(|c| c.is_alphanumeric() || self.is_allowed_symbol(c))
    }

    fn length_severity(&self, length: usize) -> Option<Severity> {
        self.min_length
            .severity_below(length)
            .or_else(|| self.max_length.severity_above(length))
    }
}

syntax_rule! {
    /// Checks names of variables, functions, parameters and enum cases.
    IdentifierNameRule {
        configuration: IdentifierNameConfiguration,
        visitor: IdentifierNameVisitor,
        description: &RuleDescription {
            severity_configurable: false,
            deprecated_aliases: &["variable_name"],
            non_triggering_examples: &[
                Example::new("let myLet = 0\n"),
                Example::new("var myVar = 0\n"),
                Example::new("private let _myLet = 0\n"),
                Example::new("class Abc { static let MyLet = 0 }\n"),
                Example::new("let URL: NSURL? = nil\n"),
                Example::new("let `default` = 0\n"),
                Example::new("let id = 1\n"),
                Example::new("func isOperator(name: String) -> Bool {}\n"),
                Example::new("func == (lhs: Foo, rhs: Foo) -> Bool {}\n"),
                Example::new("override func IsOperator() {}\n"),
                Example::new("enum Color { case red, green }\n"),
                Example::new("if let value = optional {}\n"),
                Example::new("let (first, second) = pair\n"),
                Example::new("func run(_ input: Int) {}\n"),
                Example::configured("let ab = 0\n", "min_length = { warning = 2 }"),
                Example::configured("let my_let = 0\n", "allowed_symbols = [\"_\"]"),
                Example::configured(
                    "let MyLet = 0\n",
                    "validates_start_with_lowercase = \"off\"",
                ),
            ],
            triggering_examples: &[
                Example::new("let ↓MyLet = 0\n"),
                Example::new("let ↓_myLet = 0\n"),
                Example::new("private let ↓myLet_ = 0\n"),
                Example::new("let ↓myExtremelyVeryVeryVeryVeryVeryVeryLongLet = 0\n"),
                Example::new("var ↓ab = 0\n"),
                Example::new("let ↓x = 0\n"),
                Example::new("func ↓IsOperator(name: String) -> Bool {}\n"),
                Example::new("enum Foo { case ↓MyEnum }\n"),
                Example::new("func run(↓a: Int) {}\n"),
                Example::new("if let ↓v = optional {}\n"),
                Example::new("let (↓a, second) = pair\n"),
                Example::new("let ↓`Default` = 0\n"),
                Example::configured("let ↓abc = 0\n", "excluded = []\nmin_length = { warning = 4 }"),
            ],
            ..RuleDescription::new(
                "identifier_name",
                "Identifier Name",
                "Identifier names should only contain alphanumeric characters and start with a lowercase character or should only contain capital letters",
                RuleKind::Style,
            )
        },
    }
}

/// What kind of declaration a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameKind {
    Function,
    EnumElement,
    Variable { is_static: bool },
}

/// A name found in the tree, ready to be checked.
struct NamedDecl<'n> {
    kind: NameKind,
    /// The name as checked: backticks removed, private underscore stripped.
    name: &'n str,
    /// The name as shown in the reason.
    display: String,
}

impl fmt::Display for NamedDecl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NameKind::Function => write!(f, "Function name '{}'", self.display),
            NameKind::EnumElement => write!(f, "Enum element name '{}'", self.display),
            NameKind::Variable { .. } => write!(f, "Variable name '{}'", self.display),
        }
    }
}

struct IdentifierNameVisitor<'a> {
    configuration: &'a IdentifierNameConfiguration,
    violations: Vec<ReasonedViolation>,
}

impl<'a> IdentifierNameVisitor<'a> {
    fn new(configuration: &'a IdentifierNameConfiguration, _file: &LintFile) -> Self {
        Self {
            configuration,
            violations: Vec::new(),
        }
    }

    fn check(&mut self, token: SyntaxToken<'_>, kind: NameKind, is_private: bool) {
        if token.is_missing() {
            return;
        }
        let text = token.text().trim_matches('`');
        let name = if is_private {
            text.strip_prefix('_').unwrap_or(text)
        } else {
            text
        };
        self.check_named(
            token,
            &NamedDecl {
                kind,
                name,
                display: text.to_string(),
            },
        );
    }

    fn check_named(&mut self, token: SyntaxToken<'_>, decl: &NamedDecl<'_>) {
        if let Some((reason, severity)) = self.violates(decl) {
            self.violations.push(
                ReasonedViolation::new(token.position_after_leading_trivia())
                    .with_reason(reason)
                    .with_severity(severity),
            );
        }
    }

    fn violates(&self, decl: &NamedDecl<'_>) -> Option<(String, Severity)> {
        let config = self.configuration;
        let name = decl.name;
        if name == "_" || config.excluded.iter().any(|e| e == name) {
            return None;
        }
        let first = name.chars().next()?;

        if decl.kind != NameKind::Function {
            if !config.contains_only_allowed_characters(name) {
                return Some((
                    format!("{decl} should only contain alphanumeric and other allowed characters"),
                    config.unallowed_symbols_severity,
                ));
            }
            if let Some(severity) = config.length_severity(name.chars().count()) {
                return Some((
                    format!(
                        "{decl} should be between {} and {} characters long",
                        config.min_length.warning, config.max_length.warning
                    ),
                    severity,
                ));
            }
        }

        if config.is_allowed_symbol(first) {
            return None;
        }
        let is_static = matches!(decl.kind, NameKind::Variable { is_static: true });
        let severity = config.validates_start_with_lowercase.severity()?;
        (!is_static && is_violating_case(name)).then(|| {
            (
                format!("{decl} should start with a lowercase character"),
                severity,
            )
        })
    }

    fn check_binding(&mut self, binding: ast::PatternBinding<'_>) {
        let declaration = binding
            .syntax()
            .parent()
            .and_then(ast::VariableDecl::cast);
        if declaration.is_some_and(|d| d.has_modifier(Keyword::Override)) {
            return;
        }
        let is_static = declaration
            .is_some_and(|d| d.has_modifier(Keyword::Static) || d.has_modifier(Keyword::Class));
        let is_private = declaration.is_some_and(is_private);
        let kind = NameKind::Variable { is_static };

        if let Some(name) = binding.name() {
            self.check(name, kind, is_private);
            return;
        }
        // Tuple patterns: every bound name.
        if let Some(pattern) = binding.syntax().child_of_kind(NodeKind::TupleExpr) {
            let names: Vec<_> = pattern
                .descendants()
                .filter_map(ast::IdentifierExpr::cast)
                .filter_map(|e| e.identifier())
                .filter(|t| t.kind() == TokenKind::Identifier)
                .collect();
            for name in names {
                self.check(name, kind, is_private);
            }
        }
    }
}

fn is_private<'t, D: DeclSyntax<'t>>(decl: D) -> bool {
    decl.has_modifier(Keyword::Private) || decl.has_modifier(Keyword::Fileprivate)
}

/// An uppercase first character, unless the name continues in uppercase.
fn is_violating_case(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    chars.next().map_or(true, char::is_lowercase)
}

/// `name(label:label:)` for reasons.
fn resolved_function_name(function: ast::FunctionDecl<'_>, name: &str) -> String {
    let labels: String = function
        .parameters()
        .map(|clause| {
            clause
                .parameters()
                .map(|p| {
                    p.names()
                        .next()
                        .map_or_else(|| "_:".to_string(), |t| format!("{}:", t.text()))
                })
                .collect()
        })
        .unwrap_or_default();
    format!("{name}({labels})")
}

impl SyntaxVisitor for IdentifierNameVisitor<'_> {
    fn visit_function_decl(&mut self, node: ast::FunctionDecl<'_>) -> VisitAction {
        if node.has_modifier(Keyword::Override) {
            return VisitAction::VisitChildren;
        }
        let Some(token) = node.name() else {
            return VisitAction::VisitChildren;
        };
        if !matches!(token.kind(), TokenKind::Identifier) || token.is_missing() {
            return VisitAction::VisitChildren;
        }
        let text = token.text().trim_matches('`');
        self.check_named(
            token,
            &NamedDecl {
                kind: NameKind::Function,
                name: text,
                display: resolved_function_name(node, text),
            },
        );
        VisitAction::VisitChildren
    }

    fn visit_parameter(&mut self, node: ast::Parameter<'_>) -> VisitAction {
        let in_signature = node
            .syntax()
            .parent()
            .is_some_and(|p| p.is(NodeKind::ParameterClause));
        if in_signature {
            if let Some(name) = node.names().last() {
                self.check(name, NameKind::Variable { is_static: false }, false);
            }
        }
        VisitAction::VisitChildren
    }

    fn visit_pattern_binding(&mut self, node: ast::PatternBinding<'_>) -> VisitAction {
        self.check_binding(node);
        VisitAction::VisitChildren
    }

    fn visit_enum_case_decl(&mut self, node: ast::EnumCaseDecl<'_>) -> VisitAction {
        for name in node.element_names() {
            self.check(name, NameKind::EnumElement, false);
        }
        VisitAction::VisitChildren
    }
}

impl RuleVisitor for IdentifierNameVisitor<'_> {
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        Ok(self.violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintel_core::testing::{lint_source, verify_rule};

    fn reasons(source: &str) -> Vec<(String, Severity)> {
        lint_source::<IdentifierNameRule>(None, source)
            .unwrap()
            .violations
            .into_iter()
            .map(|v| (v.reason, v.severity))
            .collect()
    }

    #[test]
    fn examples() {
        verify_rule::<IdentifierNameRule>();
    }

    #[test]
    fn length_severity_follows_the_thresholds() {
        assert_eq!(
            reasons("let ab = 0\nlet a = 1\n"),
            vec![
                (
                    "Variable name 'ab' should be between 3 and 40 characters long".to_string(),
                    Severity::Warning
                ),
                (
                    "Variable name 'a' should be between 3 and 40 characters long".to_string(),
                    Severity::Error
                ),
            ]
        );
    }

    #[test]
    fn symbols_are_reported_before_length() {
        insta::assert_snapshot!(
            reasons("let a_ = 0\n")[0].0,
            @"Variable name 'a_' should only contain alphanumeric and other allowed characters"
        );
    }

    #[test]
    fn function_reasons_use_the_full_name() {
        assert_eq!(
            reasons("func Make(width: Int, _ height: Int) {}\n"),
            vec![(
                "Function name 'Make(width:_:)' should start with a lowercase character".to_string(),
                Severity::Error
            )]
        );
    }

    #[test]
    fn case_check_severity_is_configurable() {
        let report = lint_source::<IdentifierNameRule>(
            Some("validates_start_with_lowercase = \"warning\""),
            "let MyLet = 0\n",
        )
        .unwrap();
        assert_eq!(report.violations[0].severity, Severity::Warning);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = lint_source::<IdentifierNameRule>(
            Some("min_length = { warning = 2, error = 3 }"),
            "",
        )
        .unwrap_err();
        assert!(err.contains("min_length"));
    }

    #[test]
    fn severity_is_not_a_configuration_key() {
        assert!(lint_source::<IdentifierNameRule>(Some("severity = \"error\""), "").is_err());
    }

    #[test]
    fn case_detection() {
        assert!(is_violating_case("MyLet"));
        assert!(is_violating_case("X"));
        assert!(!is_violating_case("URL"));
        assert!(!is_violating_case("myLet"));
        assert!(!is_violating_case("_x"));
    }
}
