#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

pub const ANSH: &str = env!("CARGO_BIN_EXE_ansh");

/// The binary with a clean logging environment.
pub fn ansh() -> Command {
    let mut cmd = Command::new(ANSH);
    cmd.env_remove("ANSH_LOG");
    cmd
}

/// A scratch directory holding the script and anything it touches.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    /// An executable `/bin/sh` script at `name`.
    pub fn executable(&self, name: &str, body: &str) -> PathBuf {
        let path = self.write(name, &format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("read file")
    }

    /// `ansh` prepared to run `script` from inside the workspace.
    pub fn command(&self, script: &str) -> Command {
        let path = self.write("script.ansh", script);
        let mut cmd = ansh();
        cmd.arg(path).current_dir(self.path()).stdin(Stdio::null());
        cmd
    }

    pub fn run(&self, script: &str) -> Output {
        self.command(script).output().expect("run ansh")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
