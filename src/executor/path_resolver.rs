use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};
use tracing::debug;

use crate::environment::SearchPath;

pub struct PathResolver;

impl PathResolver {
    /// Find the executable for `command`.
    ///
    /// Names containing a `/` are checked as given. Anything else is joined
    /// with each search directory in order and the first executable regular
    /// file wins. `None` means "not found" and must not lead to a fork.
    pub fn resolve(&self, command: &str, search_path: &SearchPath) -> Option<PathBuf> {
        if command.contains('/') {
            let path = Path::new(command);
            return is_executable(path).then(|| path.to_path_buf());
        }

        let found = search_path
            .iter()
            .map(|dir| dir.join(command))
            .find(|candidate| is_executable(candidate));
        debug!(command, found = ?found, dirs = search_path.len(), "path lookup");
        found
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}
