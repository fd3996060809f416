// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dockergoal`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dockergoal",
    version,
    about = "Bring a set of docker containers to their declared running state.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the goal file (TOML).
    ///
    /// Default: `Goals.toml` in the current working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the docker binary.
    #[arg(long, value_name = "PATH", default_value = "docker")]
    pub docker: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DOCKERGOAL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the round plan, but don't touch any container.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
