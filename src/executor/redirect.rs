use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, RawFd};

use nix::unistd::dup2;
use tracing::debug;

use crate::ast::Redirect;
use crate::executor::ExecError;

/// Output file prepared in the parent before fork.
///
/// The child points its stdout at the file with `apply_in_child`; the
/// parent's own stdout is never replaced, so dropping this handle after the
/// child is reaped is all the teardown there is.
pub struct StdoutRedirect {
    file: File,
}

impl StdoutRedirect {
    pub fn open(redirect: &Redirect) -> Result<Self, ExecError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(redirect.path())
            .map_err(|source| ExecError::Redirect {
                file: redirect.path().to_path_buf(),
                source,
            })?;
        debug!(file = %redirect.path().display(), fd = file.as_raw_fd(), "opened output file");
        Ok(StdoutRedirect { file })
    }

    pub fn raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Child side only: make fd 1 refer to the prepared file.
    pub fn apply_in_child(fd: RawFd) -> nix::Result<()> {
        if fd != libc::STDOUT_FILENO {
            dup2(fd, libc::STDOUT_FILENO)?;
        }
        Ok(())
    }
}
