use thiserror::Error;

use crate::config::ConfigError;
use crate::executor::ExecError;
use crate::io::InputError;

/// Failures that stop the shell. Everything recoverable is reported per
/// command group and never reaches this type.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ShellResult<T> = Result<T, ShellError>;
