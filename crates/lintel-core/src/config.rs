//! Project configuration (`lintel.toml`).

use crate::error::ConfigurationError;
use crate::linter::{ActiveRule, Linter};
use crate::registry::RuleRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Top-level configuration for lintel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Rules that never run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rules: Vec<String>,

    /// Opt-in rules to enable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opt_in_rules: Vec<String>,

    /// When non-empty, exactly these rules run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_rules: Vec<String>,

    /// Per-rule configuration payloads, keyed by rule identifier.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, toml::Table>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Resolves the active rules against `registry`.
    ///
    /// Unknown identifiers and invalid payloads are collected as issues;
    /// a rule whose payload is invalid is left out.
    #[must_use]
    pub fn resolve(&self, registry: &RuleRegistry) -> Resolution {
        let mut issues = Vec::new();
        let canonical = CanonicalLists {
            disabled: canonicalize(registry, &self.disabled_rules, &mut issues),
            opt_in: canonicalize(registry, &self.opt_in_rules, &mut issues),
            only: canonicalize(registry, &self.only_rules, &mut issues),
        };
        let mut payloads: BTreeMap<&'static str, &toml::Table> = BTreeMap::new();
        for (key, payload) in &self.rules {
            match registry.get(key) {
                Some(descriptor) => {
                    let id = descriptor.description.identifier;
                    // The canonical key wins over an alias.
                    if key == id || !payloads.contains_key(id) {
                        payloads.insert(id, payload);
                    }
                }
                None => issues.push(ConfigurationError::UnknownRule {
                    rule_id: key.clone(),
                }),
            }
        }

        let empty = toml::Table::new();
        let mut rules = Vec::new();
        for descriptor in registry.iter() {
            let description = descriptor.description;
            if !canonical.enables(description.identifier, description.opt_in) {
                tracing::debug!(rule = description.identifier, "rule not enabled");
                continue;
            }
            let payload = payloads.get(description.identifier).copied().unwrap_or(&empty);
            match descriptor.instantiate(payload) {
                Ok(rule) => rules.push(ActiveRule::new(rule)),
                Err(error) => {
                    tracing::warn!(rule = description.identifier, "{error}");
                    issues.push(error);
                }
            }
        }

        for issue in &issues {
            if let ConfigurationError::UnknownRule { rule_id } = issue {
                tracing::warn!(rule = %rule_id, "unknown rule identifier in configuration");
            }
        }
        Resolution { rules, issues }
    }
}

/// The rule lists with aliases resolved.
///
/// `only_rules` wins over the opt-in flag; `disabled_rules` always removes
/// a rule.
struct CanonicalLists {
    disabled: BTreeSet<&'static str>,
    opt_in: BTreeSet<&'static str>,
    only: BTreeSet<&'static str>,
}

impl CanonicalLists {
    fn enables(&self, id: &str, opt_in: bool) -> bool {
        if self.disabled.contains(id) {
            return false;
        }
        if !self.only.is_empty() {
            return self.only.contains(id);
        }
        !opt_in || self.opt_in.contains(id)
    }
}

/// Maps identifiers and aliases to canonical identifiers, recording unknown ones.
fn canonicalize(
    registry: &RuleRegistry,
    ids: &[String],
    issues: &mut Vec<ConfigurationError>,
) -> BTreeSet<&'static str> {
    let mut resolved = BTreeSet::new();
    for id in ids {
        match registry.get(id) {
            Some(descriptor) => {
                resolved.insert(descriptor.description.identifier);
            }
            None => {
                let issue = ConfigurationError::UnknownRule {
                    rule_id: id.clone(),
                };
                if !issues.contains(&issue) {
                    issues.push(issue);
                }
            }
        }
    }
    resolved
}

/// Outcome of [`Config::resolve`].
#[derive(Debug, Default)]
pub struct Resolution {
    /// Active rules in registry order.
    pub rules: Vec<ActiveRule>,
    /// Problems found along the way; none of them is fatal.
    pub issues: Vec<ConfigurationError>,
}

impl Resolution {
    /// Builds a linter from the active rules.
    #[must_use]
    pub fn into_linter(self) -> Linter {
        Linter::new(self.rules)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns a file must match to be linted.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Worker threads; `None` uses the rayon default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            include: default_include(),
            exclude: default_exclude(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_include() -> Vec<String> {
    vec!["**/*.swift".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["**/.build/**".to_string(), "**/Pods/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
