use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::environment::Environment;
use crate::executor::builtin::manager::BuiltinCommand;
use crate::executor::builtin::{BuiltinError, BuiltinOutcome, BuiltinStatus};

/// `exit` takes no arguments and ends the shell with status 0.
pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }
    fn run(&self, args: &[String], _env: &mut Environment) -> BuiltinStatus {
        if !args.is_empty() {
            return Err(BuiltinError::TooManyArguments("exit"));
        }
        Ok(BuiltinOutcome::Exit(0))
    }
}

/// `cd DIR` with exactly one operand.
pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn run(&self, args: &[String], _env: &mut Environment) -> BuiltinStatus {
        match args {
            [] => Err(BuiltinError::MissingOperand("cd")),
            [dir] => change_dir(Path::new(dir)),
            _ => Err(BuiltinError::TooManyArguments("cd")),
        }
    }
}

fn change_dir(dir: &Path) -> BuiltinStatus {
    let first = match env::set_current_dir(dir) {
        Ok(()) => return Ok(BuiltinOutcome::Continue),
        Err(err) => err,
    };
    // Second chance relative to the working directory.
    if let Ok(cwd) = env::current_dir() {
        let joined = cwd.join(dir);
        if joined != dir && env::set_current_dir(&joined).is_ok() {
            return Ok(BuiltinOutcome::Continue);
        }
    }
    Err(BuiltinError::ChangeDir {
        dir: dir.to_path_buf(),
        source: first,
    })
}

/// `path [DIR...]` replaces the search path; no operands clears it.
pub struct PathCommand;

impl BuiltinCommand for PathCommand {
    fn name(&self) -> &'static str {
        "path"
    }
    fn run(&self, args: &[String], env: &mut Environment) -> BuiltinStatus {
        env.search_path_mut().replace(args.iter().map(PathBuf::from));
        debug!(dirs = ?args, "search path replaced");
        Ok(BuiltinOutcome::Continue)
    }
}
