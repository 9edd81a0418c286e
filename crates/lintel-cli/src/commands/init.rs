//! `init` command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# lintel configuration

# Rule lists must come before the first [table] header.

# Rules that never run
# disabled_rules = ["trailing_whitespace"]

# Opt-in rules to enable
opt_in_rules = ["sorted_imports"]

# When non-empty, exactly these rules run
# only_rules = []

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./Sources"

# Glob patterns a file must match
include = ["**/*.swift"]

# Glob patterns to exclude from analysis
exclude = [
    "**/.build/**",
    "**/Pods/**",
    "**/Generated/**",
]

# Respect .gitignore files
respect_gitignore = true

# Worker threads (default: one per core)
# parallelism = 4

# Per-rule options; every rule except identifier_name and nesting accepts
# `severity = "warning" | "error"`

[rules.trailing_whitespace]
ignores_empty_lines = false
ignores_comments = true

[rules.identifier_name]
min_length = { warning = 3, error = 2 }
max_length = { warning = 40, error = 60 }
excluded = ["id"]

# [rules.nesting]
# type_level = { warning = 1 }
# function_level = { warning = 2 }
"#;

/// Writes a starter `lintel.toml` into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join("lintel.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit lintel.toml to configure rules");
    println!("  2. Run: lintel lint");

    Ok(())
}
