//! Error types shared across the engine.
//!
//! Errors are attributed to the smallest unit that failed: a rule's
//! configuration, a rule run over one file, or one file's parse.

use crate::position::AbsolutePosition;
use std::path::PathBuf;

/// A rule configuration payload could not be bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Unknown keys or values of the wrong type.
    #[error("invalid configuration for rule '{rule_id}': {message}")]
    InvalidPayload {
        /// Rule whose payload was rejected.
        rule_id: String,
        /// Deserializer message naming the offending key or value.
        message: String,
    },

    /// A numeric setting is outside its allowed range.
    #[error("configuration value out of range for rule '{rule_id}': {message}")]
    OutOfRange {
        /// Rule whose payload was rejected.
        rule_id: String,
        /// Which setting and why.
        message: String,
    },

    /// An identifier in the configuration names no registered rule.
    #[error("unknown rule identifier '{rule_id}'")]
    UnknownRule {
        /// The unresolved identifier.
        rule_id: String,
    },
}

impl ConfigurationError {
    /// The rule identifier the error is attributed to.
    #[must_use]
    pub fn rule_id(&self) -> &str {
        match self {
            Self::InvalidPayload { rule_id, .. }
            | Self::OutOfRange { rule_id, .. }
            | Self::UnknownRule { rule_id } => rule_id,
        }
    }
}

/// A rule failed while walking one file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[error("rule '{rule_id}' failed: {message}")]
pub struct RuleExecutionError {
    /// The failing rule.
    pub rule_id: String,
    /// What went wrong.
    pub message: String,
    /// File being linted, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl RuleExecutionError {
    /// Creates an error for `rule_id`.
    #[must_use]
    pub fn new(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Attaches the file path.
    #[must_use]
    pub fn in_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }
}

/// The source could not be turned into a tree at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse failure at byte {position}: {message}")]
pub struct ParseFailure {
    /// What the lexer or parser rejected.
    pub message: String,
    /// Where it was rejected.
    pub position: AbsolutePosition,
}

impl ParseFailure {
    /// Creates a parse failure.
    #[must_use]
    pub fn new(message: impl Into<String>, position: AbsolutePosition) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}
