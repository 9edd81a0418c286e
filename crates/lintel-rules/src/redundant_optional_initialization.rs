//! Rule against initializing optional variables with `nil`.
//!
//! # Rationale
//!
//! An optional `var` starts out as `nil` anyway; spelling it out is noise.
//!
//! # Detected Patterns
//!
//! - `var x: T? = nil`
//! - `var x: Optional<T> = nil`
//!
//! Constants, `lazy` variables and implicitly unwrapped optionals (`T!`) are
//! left alone. So are properties carrying one of the
//! `excluded_attribute_names`, since property wrappers may need the explicit
//! initial value.

use lintel_core::ast::{self, AstNode, DeclSyntax};
use lintel_core::syntax::{Keyword, NodeKind, SyntaxNode, TokenKind, ViewMode};
use lintel_core::{
    ByteRange, Correction, CorrectionExample, Example, LintFile, ReasonedViolation,
    RuleConfiguration, RuleDescription, RuleExecutionError, RuleKind, RuleVisitor, Severity,
    SyntaxVisitor, VisitAction,
};
use serde::{Deserialize, Serialize};

/// Configuration for [`RedundantOptionalInitializationRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RedundantOptionalInitializationConfiguration {
    /// Violation severity.
    pub severity: Severity,
    /// Attributes (without `@`) that exempt a declaration.
    pub excluded_attribute_names: Vec<String>,
}

impl Default for RedundantOptionalInitializationConfiguration {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            excluded_attribute_names: vec!["Parameter".to_string()],
        }
    }
}

impl RuleConfiguration for RedundantOptionalInitializationConfiguration {
    fn severity(&self) -> Severity {
        self.severity
    }
}

syntax_rule! {
    /// Flags `var x: T? = nil` and removes the initializer.
    RedundantOptionalInitializationRule {
        configuration: RedundantOptionalInitializationConfiguration,
        visitor: RedundantNilVisitor,
        description: &RuleDescription {
            correctable: true,
            non_triggering_examples: &[
                Example::new("var myVar: Int? = 5\n"),
                Example::new("let myVar: Int? = nil\n"),
                Example::new("var myVar: Int?\n"),
                Example::new("var myVar: Int! = nil\n"),
                Example::new("lazy var myVar: Int? = nil\n"),
                Example::new("var myVar: Int = 0\n"),
                Example::new("var myVar = nil as Int?\n"),
                Example::new("@Parameter var isEnabled: Bool? = nil\n"),
                Example::new("func f() {\n    if let value = optional {}\n}\n"),
            ],
            triggering_examples: &[
                Example::new("var myVar: Int?↓ = nil\n"),
                Example::new("var myVar: Int?↓   =   nil\n"),
                Example::new("var myVar: Optional<Int>↓ = nil\n"),
                Example::new("private(set) var name: String?↓ = nil\n"),
                Example::new("var a: Int?↓ = nil, b: String?↓ = nil\n"),
                Example::new("func f() {\n    var count: Int?↓ = nil\n}\n"),
                Example::new("class A {\n    var delegate: Delegate?↓ = nil\n}\n"),
                Example::configured(
                    "@Parameter var isEnabled: Bool?↓ = nil\n",
                    "excluded_attribute_names = []",
                ),
            ],
            corrections: &[
                CorrectionExample::new(
                    Example::new("var myVar: Int?↓ = nil\n"),
                    "var myVar: Int?\n",
                ),
                CorrectionExample::new(
                    Example::new("var myVar: Optional<Int>↓ = nil\n"),
                    "var myVar: Optional<Int>\n",
                ),
                CorrectionExample::new(
                    Example::new("var myVar: String?↓ = nil, b: Int\n"),
                    "var myVar: String?, b: Int\n",
                ),
                CorrectionExample::new(
                    Example::new("var a: Int?↓ = nil /* empty */\n"),
                    "var a: Int? /* empty */\n",
                ),
            ],
            ..RuleDescription::new(
                "redundant_optional_initialization",
                "Redundant Optional Initialization",
                "Initializing an optional variable with nil is redundant",
                RuleKind::Idiomatic,
            )
        },
    }
}

struct RedundantNilVisitor<'a> {
    configuration: &'a RedundantOptionalInitializationConfiguration,
    violations: Vec<ReasonedViolation>,
}

impl<'a> RedundantNilVisitor<'a> {
    fn new(configuration: &'a RedundantOptionalInitializationConfiguration, _file: &LintFile) -> Self {
        Self {
            configuration,
            violations: Vec::new(),
        }
    }

    fn is_exempt(&self, decl: ast::VariableDecl<'_>) -> bool {
        if !decl.is_var() || decl.has_modifier(Keyword::Lazy) {
            return true;
        }
        decl.syntax()
            .child_nodes()
            .filter_map(ast::Attribute::cast)
            .filter_map(|a| a.name())
            .any(|name| {
                self.configuration
                    .excluded_attribute_names
                    .iter()
                    .any(|excluded| excluded == name.text())
            })
    }
}

/// `T?` or `Optional<T>`, but not `T!`.
fn is_optional_type(node: SyntaxNode<'_>) -> bool {
    match node.node_kind() {
        Some(NodeKind::OptionalType) => node
            .last_token(ViewMode::SourceAccurate)
            .is_some_and(|t| t.kind() == TokenKind::Question),
        Some(NodeKind::IdentifierType) => {
            let mut tokens = node.child_tokens().filter(|t| !t.is_missing());
            let is_optional_name = tokens.next().is_some_and(|t| t.text() == "Optional");
            is_optional_name && tokens.next().is_some_and(|t| t.text() == "<")
        }
        _ => false,
    }
}

fn is_nil(node: SyntaxNode<'_>) -> bool {
    ast::LiteralExpr::cast(node).is_some_and(|literal| literal.is_nil())
}

impl SyntaxVisitor for RedundantNilVisitor<'_> {
    fn skippable_declarations(&self) -> &'static [NodeKind] {
        &[NodeKind::ProtocolDecl]
    }

    fn visit_variable_decl(&mut self, node: ast::VariableDecl<'_>) -> VisitAction {
        if self.is_exempt(node) {
            return VisitAction::VisitChildren;
        }
        for binding in node.bindings() {
            let Some(annotation) = binding.type_annotation() else {
                continue;
            };
            let Some(initializer) = binding.initializer() else {
                continue;
            };
            let optional = annotation.type_node().is_some_and(is_optional_type);
            if !optional || !initializer.value().is_some_and(is_nil) {
                continue;
            }
            let start = annotation.syntax().end_position_before_trailing_trivia();
            let end = initializer.syntax().end_position_before_trailing_trivia();
            self.violations.push(
                ReasonedViolation::new(start)
                    .with_correction(Correction::remove(ByteRange::new(start, end))),
            );
        }
        VisitAction::VisitChildren
    }
}

impl RuleVisitor for RedundantNilVisitor<'_> {
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        Ok(self.violations)
    }
}
