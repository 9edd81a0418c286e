//! # lintel
//!
//! Style linter with automatic correction over lossless syntax trees.
//!
//! This is the facade crate that re-exports the engine and the built-in
//! rules.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let report = lintel::lint_str("foo ()")?;
//! assert_eq!(report.violations[0].rule_id, "function_call_spacing");
//!
//! assert_eq!(lintel::correct_str("foo ()")?, "foo()");
//! ```
//!
//! ## Whole Projects
//!
//! ```rust,ignore
//! use lintel::{Analyzer, Config};
//!
//! let config = Config::from_file("lintel.toml".as_ref())?;
//! let linter = lintel::resolve(&config).into_linter();
//! let analyzer = Analyzer::builder().config(config).linter(linter).build()?;
//! let result = analyzer.analyze()?;
//! println!("{}", result.summary());
//! ```

#![forbid(unsafe_code)]

pub use lintel_core::*;

/// Built-in rules and their registry.
pub mod rules {
    pub use lintel_rules::*;
}

/// Resolves `config` against the built-in rules.
#[must_use]
pub fn resolve(config: &Config) -> Resolution {
    config.resolve(&rules::builtin_registry())
}

/// Lints `source` with the default rule set.
///
/// # Errors
///
/// Returns the parse failure if `source` cannot be parsed.
pub fn lint_str(source: &str) -> Result<FileReport, ParseFailure> {
    let file = LintFile::from_source(source)?;
    Ok(resolve(&Config::default()).into_linter().lint(&file))
}

/// Corrects `source` with the default rule set and returns the new text.
///
/// # Errors
///
/// Returns the parse failure if `source` cannot be parsed.
pub fn correct_str(source: &str) -> Result<String, ParseFailure> {
    let file = LintFile::from_source(source)?;
    let corrected = resolve(&Config::default()).into_linter().correct(file);
    Ok(corrected.file.source().to_string())
}
