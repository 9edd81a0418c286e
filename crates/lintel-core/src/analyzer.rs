//! Multi-file orchestration: discovery, parallel linting and write-back.

use crate::config::Config;
use crate::context::LintFile;
use crate::linter::Linter;
use crate::types::{FileError, LintResult};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while walking the file tree.
    #[error("failed to walk files: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    paths: Vec<PathBuf>,
    linter: Option<Linter>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    parallelism: Option<usize>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Restricts the run to these files or directories instead of the root.
    #[must_use]
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the rules to run.
    #[must_use]
    pub fn linter(mut self, linter: Linter) -> Self {
        self.linter = Some(linter);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is invalid, the working directory
    /// cannot be read, or the thread pool cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        // Builder patterns come first, then the configured ones.
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(config.analyzer.include.iter().cloned());
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());

        let include = compile(&include_patterns)?;
        let exclude = compile(&exclude_patterns)?;

        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.parallelism.or(config.analyzer.parallelism) {
            pool = pool.num_threads(threads);
        }

        Ok(Analyzer {
            root,
            paths: self.paths,
            linter: self.linter.unwrap_or_default(),
            include,
            exclude,
            respect_gitignore: config.analyzer.respect_gitignore,
            pool: pool.build()?,
        })
    }
}

fn compile(patterns: &[String]) -> Result<Vec<glob::Pattern>, glob::PatternError> {
    patterns.iter().map(|p| glob::Pattern::new(p)).collect()
}

/// Lints or corrects every matching file under a root.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    paths: Vec<PathBuf>,
    linter: Linter,
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
    pool: rayon::ThreadPool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of active rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.linter.len()
    }

    /// Lints all files and returns the results sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails. Unreadable or unparsable
    /// files are reported in [`LintResult::file_errors`] instead.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        self.run(false)
    }

    /// Corrects all files in place and returns the remaining violations
    /// plus the applied corrections.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails. Files that cannot be
    /// read, parsed or written are reported in [`LintResult::file_errors`].
    pub fn correct(&self) -> Result<LintResult, AnalyzerError> {
        self.run(true)
    }

    fn run(&self, correct: bool) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);
        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let per_file: Vec<LintResult> = self.pool.install(|| {
            files
                .par_iter()
                .map(|path| self.process(path, correct))
                .collect()
        });

        let mut result = LintResult::new();
        for file_result in per_file {
            result.extend(file_result);
        }

        info!(
            "Analysis complete: {} violations, {} corrections in {} files",
            result.violations.len(),
            result.corrections.len(),
            result.files_checked
        );
        Ok(result)
    }

    fn process(&self, path: &Path, correct: bool) -> LintResult {
        debug!("Analyzing: {}", path.display());
        let shown = self.display_path(path);
        let mut result = LintResult::new();

        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                result.file_errors.push(FileError {
                    file: shown,
                    message: e.to_string(),
                });
                return result;
            }
        };
        let file = match LintFile::parse(Some(shown.clone()), source) {
            Ok(file) => file,
            Err(failure) => {
                warn!("Failed to parse {}: {}", path.display(), failure);
                result.file_errors.push(FileError {
                    file: shown,
                    message: failure.to_string(),
                });
                return result;
            }
        };
        for command in file.regions().invalid_commands() {
            warn!(
                "{}:{}: ignoring invalid command '{}': {}",
                shown.display(),
                command.line,
                command.text,
                command.reason
            );
        }

        result.files_checked = 1;
        let report = if correct {
            let corrected = self.linter.correct(file);
            if corrected.changed() {
                if let Err(e) = std::fs::write(path, corrected.file.source()) {
                    warn!("Failed to write {}: {}", path.display(), e);
                    result.file_errors.push(FileError {
                        file: shown,
                        message: e.to_string(),
                    });
                    return result;
                }
                result.corrections = corrected.corrections;
            }
            corrected.report
        } else {
            self.linter.lint(&file)
        };
        result.violations = report.violations;
        result.rule_errors = report.rule_errors;
        result
    }

    /// The path relative to the root when it lies below it.
    fn display_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Discovers the files to analyze, sorted by path.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let starts = if self.paths.is_empty() {
            vec![self.root.clone()]
        } else {
            self.paths
                .iter()
                .map(|p| if p.is_absolute() { p.clone() } else { self.root.join(p) })
                .collect()
        };

        let mut files = Vec::new();
        for start in starts {
            let walker = ignore::WalkBuilder::new(&start)
                .git_ignore(self.respect_gitignore)
                .git_exclude(self.respect_gitignore)
                .git_global(self.respect_gitignore)
                .require_git(false)
                .build();
            for entry in walker {
                let entry = entry?;
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = entry.into_path();
                if self.is_selected(&path) {
                    files.push(path);
                } else {
                    debug!("Skipping: {}", path.display());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Whether `path` matches an include pattern and no exclude pattern.
    fn is_selected(&self, path: &Path) -> bool {
        let relative = self.display_path(path);
        let matches = |pattern: &glob::Pattern| pattern.matches_path(&relative);
        self.include.iter().any(matches) && !self.exclude.iter().any(matches)
    }
}
