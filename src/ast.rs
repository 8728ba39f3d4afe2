use std::path::{Path, PathBuf};

use crate::parser::ParseError;

/// One `&`-delimited unit of an input line, ready to launch.
///
/// The argument vector always holds a non-empty program name at index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    argv: Vec<String>,
    redirect: Option<Redirect>,
}

/// Standard output of the group goes to `file` (created or truncated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub file: PathBuf,
}

impl CommandGroup {
    pub fn new(argv: Vec<String>, redirect: Option<Redirect>) -> Result<Self, ParseError> {
        match argv.first() {
            Some(program) if !program.is_empty() => Ok(CommandGroup { argv, redirect }),
            _ => Err(ParseError::EmptyCommand),
        }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }
}

impl Redirect {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Redirect { file: file.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}
