//! `lint` and `correct` command implementation.

use anyhow::{Context, Result};
use lintel_core::Analyzer;
use lintel_rules::builtin_registry;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config_resolver::ConfigSource;
use crate::RunArgs;

/// Runs a lint or correct pass and returns the exit status.
pub fn run(args: &RunArgs, source: &ConfigSource, correct: bool, strict: bool) -> Result<ExitCode> {
    let mut config = source.load()?;
    if let Some(filter) = &args.rules {
        config.only_rules = filter
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
    }

    let resolution = config.resolve(&builtin_registry());
    if !resolution.issues.is_empty() {
        tracing::debug!("{} configuration issue(s)", resolution.issues.len());
    }

    let cwd = std::env::current_dir()?;
    let base = source
        .base_dir()
        .map_or_else(|| cwd.clone(), |dir| absolute(&cwd, dir));
    let root = base.join(&config.analyzer.root);
    let paths: Vec<PathBuf> = if args.paths.is_empty() {
        // Run from below the root, only the working directory is linted.
        if cwd.starts_with(&root) && cwd != root {
            vec![cwd.clone()]
        } else {
            Vec::new()
        }
    } else {
        args.paths.iter().map(|p| absolute(&cwd, p)).collect()
    };
    let analyzer = Analyzer::builder()
        .root(root)
        .paths(paths)
        .excludes(args.exclude.iter().cloned())
        .linter(resolution.into_linter())
        .config(config)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "{} {} with {} rules",
        if correct { "Correcting" } else { "Linting" },
        analyzer.root().display(),
        analyzer.rule_count()
    );

    let result = if correct {
        analyzer.correct()
    } else {
        analyzer.analyze()
    }
    .context("Analysis failed")?;

    super::output::print(&result, args.format, analyzer.root())?;

    let failed = result.is_failure() || (strict && !result.violations.is_empty());
    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
