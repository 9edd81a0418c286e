//! Rule limiting how deeply types and functions nest.
//!
//! A declaration's level is the number of directly enclosing declarations of
//! the same kind: types (extensions included) or functions. A type declared
//! inside a function starts over at level zero, and so does a function
//! declared inside a type.
//!
//! # Configuration
//!
//! - `type_level`: `{ warning = 1 }`
//! - `function_level`: `{ warning = 2 }`
//! - `always_allow_one_type_in_functions`: never report a type declared
//!   directly in a function body (default: false)
//! - `check_nesting_in_closures_and_statements`: also look inside closures
//!   and `if`/`guard`/`for`/`while` bodies (default: true)

use lintel_core::ast::{self, AstNode};
use lintel_core::syntax::{Keyword, SyntaxToken, TokenKind};
use lintel_core::{
    Example, LintFile, ReasonedViolation, RuleConfiguration, RuleDescription, RuleExecutionError,
    RuleKind, RuleVisitor, Severity, SeverityLevels, SyntaxVisitor, VisitAction,
};
use serde::{Deserialize, Serialize};

/// Configuration for [`NestingRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NestingConfiguration {
    /// Deepest allowed type nesting.
    pub type_level: SeverityLevels,
    /// Deepest allowed function nesting.
    pub function_level: SeverityLevels,
    /// Exempt types declared directly inside a function.
    pub always_allow_one_type_in_functions: bool,
    /// Descend into closures and statement bodies.
    pub check_nesting_in_closures_and_statements: bool,
}

impl Default for NestingConfiguration {
    fn default() -> Self {
        Self {
            type_level: SeverityLevels {
                warning: 1,
                error: None,
            },
            function_level: SeverityLevels {
                warning: 2,
                error: None,
            },
            always_allow_one_type_in_functions: false,
            check_nesting_in_closures_and_statements: true,
        }
    }
}

impl RuleConfiguration for NestingConfiguration {
    /// Violations carry the severity of the level they exceed.
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn validate(&self) -> Result<(), String> {
        self.type_level.validate_as_maximum("type_level")?;
        self.function_level.validate_as_maximum("function_level")
    }
}

syntax_rule! {
    /// Reports declarations nested deeper than the configured levels.
    NestingRule {
        configuration: NestingConfiguration,
        visitor: NestingVisitor,
        description: &RuleDescription {
            severity_configurable: false,
            non_triggering_examples: &[
                Example::new("class A {}\n"),
                Example::new("class A { class B {} }\n"),
                Example::new("struct A { enum B {} }\nextension A { struct C {} }\n"),
                Example::new("func f() { func g() { func h() {} } }\n"),
                Example::new("func f() { class A { class B {} } }\n"),
                Example::new("class A { func f() { func g() { func h() {} } } }\n"),
                Example::configured(
                    "class A { class B { class C {} } }\n",
                    "type_level = { warning = 2 }",
                ),
                Example::configured(
                    "func f() { let run = { func g() { func h() { func i() {} } } } }\n",
                    "check_nesting_in_closures_and_statements = false",
                ),
            ],
            triggering_examples: &[
                Example::new("class A { class B { ↓class C {} } }\n"),
                Example::new("struct A { struct B { ↓enum C {} } }\n"),
                Example::new("extension A { struct B { ↓protocol C {} } }\n"),
                Example::new("func f() { func g() { func h() { ↓func i() {} } } }\n"),
                Example::new("func f() { class A { class B { ↓class C {} } } }\n"),
                Example::new(
                    "func f() {\n    if ok {\n        func g() { func h() { ↓func i() {} } }\n    }\n}\n",
                ),
                Example::new("let run = { class A { class B { ↓class C {} } } }\n"),
                Example::configured(
                    "func f() { class A { ↓class B {} } }\n",
                    "always_allow_one_type_in_functions = true\ntype_level = { warning = 0 }",
                ),
            ],
            ..RuleDescription::new(
                "nesting",
                "Nesting",
                "Types should be nested at most 1 level deep, and functions should be nested at most 2 levels deep",
                RuleKind::Metrics,
            )
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Type,
    Function,
}

struct NestingVisitor<'a> {
    configuration: &'a NestingConfiguration,
    scopes: Vec<Scope>,
    violations: Vec<ReasonedViolation>,
}

impl<'a> NestingVisitor<'a> {
    fn new(configuration: &'a NestingConfiguration, _file: &LintFile) -> Self {
        Self {
            configuration,
            scopes: Vec::new(),
            violations: Vec::new(),
        }
    }

    fn enter(&mut self, scope: Scope, keyword: Option<SyntaxToken<'_>>) {
        let directly_in_function = self.scopes.last() == Some(&Scope::Function);
        // Only the innermost run of scopes of this kind counts.
        let level = self.scopes.iter().rev().take_while(|s| **s == scope).count();
        self.scopes.push(scope);

        if scope == Scope::Type
            && directly_in_function
            && self.configuration.always_allow_one_type_in_functions
        {
            return;
        }
        let levels = match scope {
            Scope::Type => &self.configuration.type_level,
            Scope::Function => &self.configuration.function_level,
        };
        let Some(severity) = levels.severity_above(level) else {
            return;
        };
        let Some(keyword) = keyword else {
            return;
        };
        let threshold = match (severity, levels.error) {
            (Severity::Error, Some(error)) => error,
            _ => levels.warning,
        };
        let noun = match scope {
            Scope::Type => "Types",
            Scope::Function => "Functions",
        };
        let plural = if threshold == 1 { "" } else { "s" };
        self.violations.push(
            ReasonedViolation::new(keyword.position_after_leading_trivia())
                .with_reason(format!(
                    "{noun} should be nested at most {threshold} level{plural} deep"
                ))
                .with_severity(severity),
        );
    }

    fn exit(&mut self) {
        self.scopes.pop();
    }

    fn descend_into_bodies(&self) -> VisitAction {
        if self.configuration.check_nesting_in_closures_and_statements {
            VisitAction::VisitChildren
        } else {
            VisitAction::SkipChildren
        }
    }
}

impl SyntaxVisitor for NestingVisitor<'_> {
    fn visit_class_decl(&mut self, node: ast::ClassDecl<'_>) -> VisitAction {
        self.enter(Scope::Type, node.keyword());
        VisitAction::VisitChildren
    }

    fn visit_post_class_decl(&mut self, _node: ast::ClassDecl<'_>) {
        self.exit();
    }

    fn visit_struct_decl(&mut self, node: ast::StructDecl<'_>) -> VisitAction {
        self.enter(Scope::Type, node.keyword());
        VisitAction::VisitChildren
    }

    fn visit_post_struct_decl(&mut self, _node: ast::StructDecl<'_>) {
        self.exit();
    }

    fn visit_enum_decl(&mut self, node: ast::EnumDecl<'_>) -> VisitAction {
        self.enter(Scope::Type, node.keyword());
        VisitAction::VisitChildren
    }

    fn visit_post_enum_decl(&mut self, _node: ast::EnumDecl<'_>) {
        self.exit();
    }

    fn visit_protocol_decl(&mut self, node: ast::ProtocolDecl<'_>) -> VisitAction {
        self.enter(Scope::Type, node.keyword());
        VisitAction::VisitChildren
    }

    fn visit_post_protocol_decl(&mut self, _node: ast::ProtocolDecl<'_>) {
        self.exit();
    }

    fn visit_extension_decl(&mut self, node: ast::ExtensionDecl<'_>) -> VisitAction {
        let keyword = node
            .syntax()
            .token_of_kind(TokenKind::Keyword(Keyword::Extension));
        self.enter(Scope::Type, keyword);
        VisitAction::VisitChildren
    }

    fn visit_post_extension_decl(&mut self, _node: ast::ExtensionDecl<'_>) {
        self.exit();
    }

    fn visit_function_decl(&mut self, node: ast::FunctionDecl<'_>) -> VisitAction {
        self.enter(Scope::Function, node.keyword());
        VisitAction::VisitChildren
    }

    fn visit_post_function_decl(&mut self, _node: ast::FunctionDecl<'_>) {
        self.exit();
    }

    fn visit_closure_expr(&mut self, _node: ast::ClosureExpr<'_>) -> VisitAction {
        self.descend_into_bodies()
    }

    fn visit_if_stmt(&mut self, _node: ast::IfStmt<'_>) -> VisitAction {
        self.descend_into_bodies()
    }

    fn visit_guard_stmt(&mut self, _node: ast::GuardStmt<'_>) -> VisitAction {
        self.descend_into_bodies()
    }

    fn visit_for_stmt(&mut self, _node: ast::ForStmt<'_>) -> VisitAction {
        self.descend_into_bodies()
    }

    fn visit_while_stmt(&mut self, _node: ast::WhileStmt<'_>) -> VisitAction {
        self.descend_into_bodies()
    }
}

impl RuleVisitor for NestingVisitor<'_> {
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        Ok(self.violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintel_core::testing::{lint_source, verify_rule};

    #[test]
    fn examples() {
        verify_rule::<NestingRule>();
    }

    #[test]
    fn reasons_name_the_threshold() {
        let report =
            lint_source::<NestingRule>(None, "class A { class B { class C {} } }\n").unwrap();
        insta::assert_snapshot!(
            report.violations[0].reason,
            @"Types should be nested at most 1 level deep"
        );
        let report = lint_source::<NestingRule>(
            None,
            "func f() { func g() { func h() { func i() {} } } }\n",
        )
        .unwrap();
        assert_eq!(
            report.violations[0].reason,
            "Functions should be nested at most 2 levels deep"
        );
    }

    #[test]
    fn error_level_reports_errors() {
        let report = lint_source::<NestingRule>(
            Some("type_level = { warning = 1, error = 2 }"),
            "class A { class B { class C { class D {} } } }\n",
        )
        .unwrap();
        let found: Vec<_> = report
            .violations
            .iter()
            .map(|v| (v.severity, v.reason.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (Severity::Warning, "Types should be nested at most 1 level deep"),
                (Severity::Error, "Types should be nested at most 2 levels deep"),
            ]
        );
    }

    #[test]
    fn inverted_levels_are_rejected() {
        assert!(lint_source::<NestingRule>(Some("function_level = { warning = 3, error = 1 }"), "")
            .is_err());
    }
}
