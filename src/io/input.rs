use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open script '{}'", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("script '{}' is empty", .0.display())]
    EmptyScript(PathBuf),
    #[error("script '{}' is not a regular file", .0.display())]
    NotAFile(PathBuf),
    #[error("line too long ({len} > {max} characters)")]
    LineTooLong { len: usize, max: usize },
    #[error("read error")]
    Io(#[from] io::Error),
}

/// Where command lines come from: the terminal or a batch script.
pub struct InputSource {
    reader: Box<dyn BufRead>,
    interactive: bool,
    max_line_len: usize,
}

impl InputSource {
    pub fn interactive(max_line_len: usize) -> Self {
        Self::from_reader(io::stdin().lock(), true, max_line_len)
    }

    /// Open a batch script, retrying relative to the working directory.
    pub fn open_batch(path: &Path, max_line_len: usize) -> Result<Self, InputError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(first) => env::current_dir()
                .and_then(|cwd| File::open(cwd.join(path)))
                .map_err(|_| InputError::Open {
                    path: path.to_path_buf(),
                    source: first,
                })?,
        };
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(InputError::NotAFile(path.to_path_buf()));
        }
        if meta.len() == 0 {
            return Err(InputError::EmptyScript(path.to_path_buf()));
        }
        Ok(Self::from_reader(BufReader::new(file), false, max_line_len))
    }

    pub fn from_reader(
        reader: impl BufRead + 'static,
        interactive: bool,
        max_line_len: usize,
    ) -> Self {
        InputSource {
            reader: Box::new(reader),
            interactive,
            max_line_len,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Next line without its terminator; `Ok(None)` at end of input.
    ///
    /// An over-long line is consumed whole and reported as an error so the
    /// caller can skip it.
    pub fn read_line(&mut self) -> Result<Option<String>, InputError> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        let len = line.chars().count();
        if len > self.max_line_len {
            return Err(InputError::LineTooLong {
                len,
                max: self.max_line_len,
            });
        }
        Ok(Some(line))
    }
}
