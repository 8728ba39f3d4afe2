mod lexer;
mod token;

pub use lexer::Tokens;

/// Separator between independent command groups on one line.
pub const GROUP_DELIMITER: char = '&';

/// Split a line into its `&`-separated command groups.
///
/// Groups are trimmed, empty groups are dropped and order is preserved.
pub fn split_groups(line: &str) -> Vec<&str> {
    line.split(GROUP_DELIMITER)
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .collect()
}

/// Split one group into its argument vector.
pub fn tokenize(group: &str) -> Vec<String> {
    Tokens::new(group).collect()
}
