//! Rule metadata and example corpora.

use crate::position::AbsolutePosition;
use serde::Serialize;

/// Marks an expected violation position inside example code.
pub const VIOLATION_MARKER: char = '↓';

/// Broad category of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Likely bugs.
    Lint,
    /// Formatting and layout.
    Style,
    /// Non-idiomatic constructs.
    Idiomatic,
    /// Size and complexity limits.
    Metrics,
    /// Wasteful constructs.
    Performance,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lint => "lint",
            Self::Style => "style",
            Self::Idiomatic => "idiomatic",
            Self::Metrics => "metrics",
            Self::Performance => "performance",
        };
        f.write_str(name)
    }
}

/// A code sample, optionally with an inline TOML configuration for the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Example {
    /// Source text; `↓` marks expected violations in triggering examples.
    pub code: &'static str,
    /// Rule configuration payload in TOML syntax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<&'static str>,
}

impl Example {
    /// An example using the default configuration.
    #[must_use]
    pub const fn new(code: &'static str) -> Self {
        Self {
            code,
            configuration: None,
        }
    }

    /// An example using `configuration`.
    #[must_use]
    pub const fn configured(code: &'static str, configuration: &'static str) -> Self {
        Self {
            code,
            configuration: Some(configuration),
        }
    }

    /// The code with markers removed, plus the marker offsets.
    #[must_use]
    pub fn strip_markers(&self) -> (String, Vec<AbsolutePosition>) {
        strip_markers(self.code)
    }
}

/// A marked input and the text it must correct to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorrectionExample {
    /// The input.
    pub input: Example,
    /// The expected output.
    pub expected: &'static str,
}

impl CorrectionExample {
    /// Pairs an input with its expected correction.
    #[must_use]
    pub const fn new(input: Example, expected: &'static str) -> Self {
        Self { input, expected }
    }
}

/// Static description of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleDescription {
    /// Unique snake_case identifier.
    pub identifier: &'static str,
    /// Human readable name.
    pub name: &'static str,
    /// What the rule checks; also the default violation reason.
    pub description: &'static str,
    /// Category.
    pub kind: RuleKind,
    /// Disabled unless explicitly enabled.
    pub opt_in: bool,
    /// Produces corrections.
    pub correctable: bool,
    /// Accepts a `severity` configuration key.
    pub severity_configurable: bool,
    /// Old identifiers that still resolve to this rule.
    pub deprecated_aliases: &'static [&'static str],
    /// Code that must not trigger.
    pub non_triggering_examples: &'static [Example],
    /// Code that must trigger at the marked positions.
    pub triggering_examples: &'static [Example],
    /// Inputs with their corrected outputs.
    pub corrections: &'static [CorrectionExample],
}

impl RuleDescription {
    /// A description with no examples, not opt-in and not correctable.
    #[must_use]
    pub const fn new(
        identifier: &'static str,
        name: &'static str,
        description: &'static str,
        kind: RuleKind,
    ) -> Self {
        Self {
            identifier,
            name,
            description,
            kind,
            opt_in: false,
            correctable: false,
            severity_configurable: true,
            deprecated_aliases: &[],
            non_triggering_examples: &[],
            triggering_examples: &[],
            corrections: &[],
        }
    }

    /// The identifier followed by the deprecated aliases.
    #[must_use]
    pub fn all_identifiers(&self) -> Vec<&'static str> {
        std::iter::once(self.identifier)
            .chain(self.deprecated_aliases.iter().copied())
            .collect()
    }

    /// Whether `id` names this rule.
    #[must_use]
    pub fn answers_to(&self, id: &str) -> bool {
        self.identifier == id || self.deprecated_aliases.contains(&id)
    }
}

/// Removes every `↓` from `code` and returns the byte offsets where they stood.
#[must_use]
pub fn strip_markers(code: &str) -> (String, Vec<AbsolutePosition>) {
    let mut cleaned = String::with_capacity(code.len());
    let mut markers = Vec::new();
    for c in code.chars() {
        if c == VIOLATION_MARKER {
            markers.push(AbsolutePosition(cleaned.len()));
        } else {
            cleaned.push(c);
        }
    }
    (cleaned, markers)
}
