use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

use crate::ast::CommandGroup;
use crate::environment::Environment;

pub type ExecStatus = Result<ExecOutcome, ExecError>;

/// How a reaped child finished. Neither variant is an error to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Exited(i32),
    Signaled(i32),
}

impl ExecOutcome {
    /// Shell-style status: the exit code, or 128 + signal number.
    pub fn code(self) -> i32 {
        match self {
            ExecOutcome::Exited(code) => code,
            ExecOutcome::Signaled(signo) => 128 + signo,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cannot open '{}' for writing", .file.display())]
    Redirect {
        file: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot update signal state")]
    Signal(#[source] Errno),
    #[error("fork failed")]
    Fork(#[source] Errno),
    #[error("waitpid({pid}) failed")]
    Wait {
        pid: i32,
        #[source]
        source: Errno,
    },
    #[error("cannot start command lane")]
    Spawn(#[source] io::Error),
    #[error("command lane for '{0}' panicked")]
    LanePanicked(String),
}

impl ExecError {
    /// Resource exhaustion the shell cannot recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Fork(_) | ExecError::Spawn(_))
    }
}

/// Runs one parsed command group to completion.
///
/// Implementations are shared by every lane of a line, hence `Sync`.
pub trait Executor: Sync {
    fn exec(&self, group: &CommandGroup, env: &Environment) -> ExecStatus;
}
