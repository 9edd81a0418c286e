//! Rule traits for defining lint rules.

use crate::configuration::{self, RuleConfiguration};
use crate::context::LintFile;
use crate::description::RuleDescription;
use crate::error::{ConfigurationError, RuleExecutionError};
use crate::types::{ReasonedViolation, Severity};
use crate::visitor::{walk, SyntaxVisitor};

/// A per-file style rule based on syntax tree traversal.
///
/// A rule owns its configuration and hands out a fresh visitor for every
/// file. The visitor collects violations during one walk and is dropped
/// afterwards, so rules keep no state between files.
///
/// # Example
///
/// ```ignore
/// use lintel_core::{ast, LintFile, ReasonedViolation, Rule, RuleVisitor, SyntaxVisitor};
///
/// struct NoCallsVisitor {
///     violations: Vec<ReasonedViolation>,
/// }
///
/// impl SyntaxVisitor for NoCallsVisitor {
///     fn visit_function_call_expr(&mut self, node: ast::FunctionCallExpr<'_>) -> VisitAction {
///         self.violations.push(node.syntax().position_after_leading_trivia().into());
///         VisitAction::VisitChildren
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Static metadata and examples.
    fn description(&self) -> &'static RuleDescription;

    /// Severity from the attached configuration.
    fn severity(&self) -> Severity;

    /// The unique identifier.
    fn identifier(&self) -> &'static str {
        self.description().identifier
    }

    /// Creates a visitor bound to `file`.
    fn make_visitor<'a>(&'a self, file: &'a LintFile) -> Box<dyn RuleVisitor + 'a>;

    /// Walks `file` and returns the violations in tree order.
    ///
    /// # Errors
    ///
    /// Returns [`RuleExecutionError`] when the visitor reports a tree shape
    /// it cannot handle.
    fn validate(&self, file: &LintFile) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
        let mut visitor = self.make_visitor(file);
        walk(&mut *visitor, file.tree().root());
        visitor.finish()
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// A visitor that yields violations once the walk is over.
pub trait RuleVisitor: SyntaxVisitor {
    /// Consumes the visitor.
    ///
    /// # Errors
    ///
    /// Returns [`RuleExecutionError`] when the walk hit an unexpected shape.
    fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError>;
}

/// A rule constructed from a typed configuration.
pub trait ConfigurableRule: Rule + Sized + 'static {
    /// The configuration type.
    type Configuration: RuleConfiguration;

    /// Static metadata and examples.
    const DESCRIPTION: &'static RuleDescription;

    /// Creates the rule with `configuration`.
    fn with_configuration(configuration: Self::Configuration) -> Self;

    /// The attached configuration.
    fn configuration(&self) -> &Self::Configuration;

    /// Creates the rule with the default configuration.
    #[must_use]
    fn with_defaults() -> Self {
        Self::with_configuration(Self::Configuration::default())
    }

    /// Binds and validates `payload`, then creates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for unknown keys, mistyped values or
    /// out-of-range settings.
    fn from_payload(payload: &toml::Table) -> Result<Self, ConfigurationError> {
        configuration::bind(Self::DESCRIPTION.identifier, payload).map(Self::with_configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::SeverityConfiguration;
    use crate::description::RuleKind;
    use crate::syntax::ast::{self, AstNode};
    use crate::visitor::VisitAction;

    const DESCRIPTION: &RuleDescription = &RuleDescription::new(
        "no_calls",
        "No Calls",
        "Calls are not allowed",
        RuleKind::Lint,
    );

    struct NoCalls(SeverityConfiguration);

    struct NoCallsVisitor {
        violations: Vec<ReasonedViolation>,
    }

    impl SyntaxVisitor for NoCallsVisitor {
        fn visit_function_call_expr(&mut self, node: ast::FunctionCallExpr<'_>) -> VisitAction {
            self.violations
                .push(node.syntax().position_after_leading_trivia().into());
            VisitAction::VisitChildren
        }
    }

    impl RuleVisitor for NoCallsVisitor {
        fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
            Ok(self.violations)
        }
    }

    impl Rule for NoCalls {
        fn description(&self) -> &'static RuleDescription {
            DESCRIPTION
        }

        fn severity(&self) -> Severity {
            self.0.severity
        }

        fn make_visitor<'a>(&'a self, _file: &'a LintFile) -> Box<dyn RuleVisitor + 'a> {
            Box::new(NoCallsVisitor {
                violations: Vec::new(),
            })
        }
    }

    impl ConfigurableRule for NoCalls {
        type Configuration = SeverityConfiguration;
        const DESCRIPTION: &'static RuleDescription = DESCRIPTION;

        fn with_configuration(configuration: Self::Configuration) -> Self {
            Self(configuration)
        }

        fn configuration(&self) -> &Self::Configuration {
            &self.0
        }
    }

    #[test]
    fn validate_walks_the_tree() {
        let file = LintFile::from_source("a(b())").unwrap();
        let violations = NoCalls::with_defaults().validate(&file).unwrap();
        let offsets: Vec<_> = violations.iter().map(|v| v.position.offset()).collect();
        assert_eq!(offsets, vec![0, 2]);
    }

    #[test]
    fn payload_sets_severity() {
        let payload: toml::Table = "severity = \"error\"".parse().unwrap();
        let rule = NoCalls::from_payload(&payload).unwrap();
        assert_eq!(rule.severity(), Severity::Error);
        assert_eq!(rule.identifier(), "no_calls");
    }
}
