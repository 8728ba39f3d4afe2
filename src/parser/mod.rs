mod output;

use thiserror::Error;

use crate::ast::{CommandGroup, Redirect};
use crate::lexer::tokenize;

pub use output::split_output;

/// Malformed command group. Only the offending group is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing command before '>'")]
    MissingCommand,
    #[error("missing file name after '>'")]
    MissingFile,
    #[error("file name must not contain whitespace: '{0}'")]
    FilenameHasSpace(String),
    #[error("more than one '>' in a command")]
    MultipleRedirects,
    #[error("empty command")]
    EmptyCommand,
}

/// Turn one raw command group into a launchable `CommandGroup`.
pub fn parse_group(raw: &str) -> Result<CommandGroup, ParseError> {
    let (command, file) = split_output(raw)?;
    CommandGroup::new(tokenize(&command), file.map(Redirect::new))
}
