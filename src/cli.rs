//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ansh",
    version,
    about = "A small line-oriented shell with concurrent '&' groups.",
    long_about = None
)]
pub struct CliArgs {
    /// Verbose diagnostics on stderr. Same as `--log-level debug`.
    #[arg(short, long)]
    pub debug: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ANSH_LOG` or `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Startup settings file (`key = value` lines).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Script to run in batch mode. Without it the shell is interactive.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
