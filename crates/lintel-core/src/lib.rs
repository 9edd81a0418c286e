//! # lintel-core
//!
//! Core engine for style linting over lossless syntax trees.
//!
//! This crate provides the machinery shared by every rule:
//!
//! - [`syntax`]: lossless trees with trivia, built by a small reference parser
//! - [`walk`] and [`SyntaxVisitor`] for per-kind traversal with pruning
//! - [`Rule`] / [`ConfigurableRule`] with typed, validated configuration
//! - [`CorrectionEngine`] for applying many rules' edits in one pass
//! - [`Linter`] for one file and [`Analyzer`] for a whole tree of files
//!
//! ## Example
//!
//! ```ignore
//! use lintel_core::{Config, LintFile};
//!
//! let linter = Config::default().resolve(&registry).into_linter();
//! let file = LintFile::from_source("foo ()")?;
//! for violation in linter.lint(&file).violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod configuration;
mod context;
mod correction;
mod description;
mod error;
mod linter;
mod position;
mod regions;
mod registry;
mod rule;
mod types;
mod visitor;

pub mod syntax;
pub mod testing;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, Resolution};
pub use configuration::{bind, RuleConfiguration, SeverityConfiguration, SeverityLevels};
pub use context::LintFile;
pub use correction::{
    CorrectionEngine, CorrectionOutcome, DropReason, DroppedCorrection, PendingCorrection,
};
pub use description::{
    strip_markers, CorrectionExample, Example, RuleDescription, RuleKind, VIOLATION_MARKER,
};
pub use error::{ConfigurationError, ParseFailure, RuleExecutionError};
pub use linter::{ActiveRule, CorrectedFile, FileReport, Linter, MAX_CORRECTION_PASSES};
pub use position::{AbsolutePosition, ByteRange, LineColumn, LineIndex};
pub use regions::{
    Action, Command, DisabledRegion, DisabledRegions, InvalidCommand, Modifier, RuleSelector,
};
pub use registry::{RuleDescriptor, RuleFactory, RuleRegistry};
pub use rule::{ConfigurableRule, Rule, RuleBox, RuleVisitor};
pub use syntax::ast;
pub use types::{
    Correction, CorrectionRecord, FileError, LintResult, Location, ReasonedViolation, Severity,
    StyleViolation, ViolationDiagnostic,
};
pub use visitor::{walk, SyntaxVisitor, VisitAction};
