use std::path::{Path, PathBuf};

/// Directories searched in the original shell when nothing else is configured.
pub const DEFAULT_SEARCH_PATH: &[&str] = &["/bin", "/usr/bin", "/opt/homebrew/bin"];

/// Ordered list of directories consulted to resolve a program name.
///
/// Earlier entries win. The only way to change it is `replace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        SearchPath {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Swap the whole list; an empty iterator clears it.
    pub fn replace<I, P>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.dirs = dirs.into_iter().map(Into::into).collect();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        SearchPath::new(DEFAULT_SEARCH_PATH.iter().copied())
    }
}

/// Shell-owned state. Builtins get it mutably on the dispatch thread,
/// concurrent lanes only ever see a shared borrow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    search_path: SearchPath,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn with_search_path(search_path: SearchPath) -> Self {
        Environment { search_path }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn search_path_mut(&mut self) -> &mut SearchPath {
        &mut self.search_path
    }
}
