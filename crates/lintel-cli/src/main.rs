//! lintel CLI tool.
//!
//! Usage:
//! ```bash
//! lintel lint [OPTIONS] [PATHS]...
//! lintel correct [OPTIONS] [PATHS]...
//! lintel rules [IDENTIFIER]
//! lintel init
//! ```
//!
//! Exit status is 0 on success, 1 when an error-severity violation remains
//! or a file could not be analyzed, and 2 when the run itself failed.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Style linter with automatic correction
#[derive(Parser)]
#[command(name = "lintel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LINTEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report style violations
    Lint {
        #[command(flatten)]
        run: RunArgs,

        /// Treat warnings as errors for the exit status
        #[arg(long)]
        strict: bool,
    },

    /// Apply corrections in place, then report what remains
    #[command(alias = "fix")]
    Correct {
        #[command(flatten)]
        run: RunArgs,
    },

    /// List available rules, or describe one
    Rules {
        /// Rule identifier or deprecated alias
        identifier: Option<String>,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by `lint` and `correct`.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Files or directories to process (default: the configured root)
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Only run specific rules (comma-separated)
    #[arg(long)]
    pub rules: Option<String>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// One-line-per-violation compact format.
    Compact,
    /// JSON output.
    Json,
    /// Diagnostics with source snippets.
    Pretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:?}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let source = config_resolver::resolve(&cwd, cli.config.as_deref());

    match cli.command {
        Commands::Lint { run, strict } => commands::lint::run(&run, &source, false, strict),
        Commands::Correct { run } => commands::lint::run(&run, &source, true, false),
        Commands::Rules { identifier } => {
            commands::rules::run(identifier.as_deref(), &source)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(&cwd, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
