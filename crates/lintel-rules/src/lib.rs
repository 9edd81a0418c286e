//! # lintel-rules
//!
//! Built-in style rules for lintel.
//!
//! Every rule is a thin consumer of the engine in `lintel-core`: a typed
//! configuration, a static description with example corpora, and a visitor
//! that reports positions and corrections.
//!
//! ## Available Rules
//!
//! | Identifier | Kind | Opt-in | Correctable | Description |
//! |------------|------|--------|-------------|-------------|
//! | `function_call_spacing` | style | no | yes | No space between a callee and its `(` |
//! | `member_access_spacing` | style | no | yes | No space around `.` in a member access chain |
//! | `trailing_whitespace` | style | no | yes | Lines should not end in whitespace |
//! | `colon` | style | no | yes | Colons hug the left side and take one space on the right |
//! | `identifier_name` | style | no | no | Naming and length limits for variables, functions and enum cases |
//! | `redundant_optional_initialization` | idiomatic | no | yes | `var x: T? = nil` is redundant |
//! | `nesting` | metrics | no | no | Limits type and function nesting depth |
//! | `sorted_imports` | style | yes | yes | Consecutive imports are sorted |
//!
//! ## Usage
//!
//! ```ignore
//! use lintel_core::{Config, LintFile};
//!
//! let registry = lintel_rules::builtin_registry();
//! let linter = Config::default().resolve(&registry).into_linter();
//! let report = linter.lint(&LintFile::from_source("foo ()")?);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

mod colon;
mod function_call_spacing;
mod identifier_name;
mod member_access_spacing;
mod nesting;
mod redundant_optional_initialization;
mod sorted_imports;
mod trailing_whitespace;

pub use colon::{ColonConfiguration, ColonRule};
pub use function_call_spacing::FunctionCallSpacingRule;
pub use identifier_name::{CaseCheck, IdentifierNameConfiguration, IdentifierNameRule};
pub use member_access_spacing::MemberAccessSpacingRule;
pub use nesting::{NestingConfiguration, NestingRule};
pub use redundant_optional_initialization::{
    RedundantOptionalInitializationConfiguration, RedundantOptionalInitializationRule,
};
pub use sorted_imports::{ImportGrouping, SortedImportsConfiguration, SortedImportsRule};
pub use trailing_whitespace::{TrailingWhitespaceConfiguration, TrailingWhitespaceRule};

/// Re-export core types for convenience.
pub use lintel_core::{ConfigurableRule, Rule, RuleRegistry, Severity, StyleViolation};

/// Builds the registry of every built-in rule, in reporting order.
#[must_use]
pub fn builtin_registry() -> RuleRegistry {
    let registry = RuleRegistry::new()
        .with::<FunctionCallSpacingRule>()
        .with::<MemberAccessSpacingRule>()
        .with::<TrailingWhitespaceRule>()
        .with::<ColonRule>()
        .with::<IdentifierNameRule>()
        .with::<RedundantOptionalInitializationRule>()
        .with::<NestingRule>()
        .with::<SortedImportsRule>();
    tracing::debug!("Registered {} built-in rules", registry.len());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_every_rule_once() {
        let registry = builtin_registry();
        let ids: Vec<_> = registry.iter().map(|r| r.description.identifier).collect();
        assert_eq!(
            ids,
            vec![
                "function_call_spacing",
                "member_access_spacing",
                "trailing_whitespace",
                "colon",
                "identifier_name",
                "redundant_optional_initialization",
                "nesting",
                "sorted_imports",
            ]
        );
    }

    #[test]
    fn only_sorted_imports_is_opt_in() {
        let registry = builtin_registry();
        let opt_in: Vec<_> = registry
            .iter()
            .filter(|r| r.description.opt_in)
            .map(|r| r.description.identifier)
            .collect();
        assert_eq!(opt_in, vec!["sorted_imports"]);
    }

    #[test]
    fn deprecated_aliases_resolve() {
        let registry = builtin_registry();
        let rule = registry.get("variable_name").unwrap();
        assert_eq!(rule.description.identifier, "identifier_name");
    }

    #[test]
    fn every_rule_builds_from_an_empty_payload() {
        for descriptor in builtin_registry().iter() {
            let rule = descriptor.instantiate(&toml::Table::new()).unwrap();
            assert_eq!(rule.identifier(), descriptor.description.identifier);
        }
    }

    #[test]
    fn correctable_rules_ship_correction_examples() {
        for descriptor in builtin_registry().iter() {
            let description = descriptor.description;
            assert_eq!(
                description.correctable,
                !description.corrections.is_empty(),
                "{}",
                description.identifier
            );
            assert!(!description.triggering_examples.is_empty());
            assert!(!description.non_triggering_examples.is_empty());
        }
    }
}
