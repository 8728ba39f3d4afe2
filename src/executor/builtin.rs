pub mod commands;
pub mod manager;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use manager::{BuiltinCommand, BuiltinManager};

pub type BuiltinStatus = Result<BuiltinOutcome, BuiltinError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    Continue,
    Exit(i32),
}

/// User errors of builtins. Reported, never fatal.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{0}: missing operand")]
    MissingOperand(&'static str),
    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),
    #[error("cd: {}", .dir.display())]
    ChangeDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}
