use super::ParseError;

const REDIRECT_OUT: char = '>';
const ESCAPE: char = '\\';

/// Split a group into its command text and optional output file.
///
/// `\>` is a literal `>` and is unescaped in the returned command text.
/// No `>` at all is a plain command, which callers must tell apart from a
/// malformed redirection (an `Err`).
pub fn split_output(group: &str) -> Result<(String, Option<String>), ParseError> {
    let group = group.trim();
    if group.starts_with(REDIRECT_OUT) {
        return Err(ParseError::MissingCommand);
    }

    let mut command = String::with_capacity(group.len());
    let mut target: Option<String> = None;
    let mut chars = group.chars().peekable();

    while let Some(ch) = chars.next() {
        let buf = match target.as_mut() {
            Some(file) => file,
            None => &mut command,
        };
        match ch {
            ESCAPE if chars.peek() == Some(&REDIRECT_OUT) => {
                chars.next();
                buf.push(REDIRECT_OUT);
            }
            REDIRECT_OUT => {
                if target.is_some() {
                    return Err(ParseError::MultipleRedirects);
                }
                target = Some(String::new());
            }
            _ => buf.push(ch),
        }
    }

    let command = command.trim();
    let Some(file) = target else {
        return Ok((command.to_string(), None));
    };
    if command.is_empty() {
        return Err(ParseError::MissingCommand);
    }

    let file = file.trim();
    if file.is_empty() {
        return Err(ParseError::MissingFile);
    }
    if file.contains(char::is_whitespace) {
        return Err(ParseError::FilenameHasSpace(file.to_string()));
    }
    Ok((command.to_string(), Some(file.to_string())))
}
