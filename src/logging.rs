//! Diagnostics via `tracing` + `tracing-subscriber`, always on stderr so
//! nothing ever lands in a command's redirected output.
//!
//! Level priority:
//! 1. `-d/--debug` (debug)
//! 2. `--log-level`
//! 3. `ANSH_LOG` environment variable (e.g. "info", "trace")
//! 4. `warn`

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "ANSH_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(debug: bool, cli_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var(LOG_ENV).ok();
    let level = select_level(debug, cli_level, env_level.as_deref());

    fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .try_init()
        .map_err(|err| anyhow!("cannot install logger: {err}"))
}

fn select_level(debug: bool, cli_level: Option<LogLevel>, env_level: Option<&str>) -> Level {
    if debug {
        return Level::DEBUG;
    }
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_level.and_then(parse_level_str).unwrap_or(Level::WARN),
    }
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_wins() {
        assert_eq!(select_level(true, Some(LogLevel::Error), Some("trace")), Level::DEBUG);
    }

    #[test]
    fn test_cli_level_beats_env() {
        assert_eq!(select_level(false, Some(LogLevel::Info), Some("trace")), Level::INFO);
    }

    #[test]
    fn test_env_then_default() {
        assert_eq!(select_level(false, None, Some(" Trace ")), Level::TRACE);
        assert_eq!(select_level(false, None, Some("loud")), Level::WARN);
        assert_eq!(select_level(false, None, None), Level::WARN);
    }
}
