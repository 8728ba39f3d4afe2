use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::{Component, Path};

use crate::config::{ColorChoice, Config};

const BLUE: &str = "\x1B[34m";
const GREEN: &str = "\x1B[32m";
const RESET: &str = "\x1B[0m";

/// Rendered in place of the directory when the cwd is `/`.
pub const ROOT_MARK: &str = "/🔒";

pub struct ShellPrompt {
    marker: String,
    banner: String,
    color: bool,
}

impl ShellPrompt {
    pub fn new(marker: &str, banner: &str, color: bool) -> Self {
        ShellPrompt {
            marker: marker.to_string(),
            banner: banner.to_string(),
            color,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let color = match config.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };
        Self::new(&config.prompt, &config.banner, color)
    }

    pub fn show_banner(&self) {
        println!("{}", self.banner);
    }

    pub fn show_prompt(&self) {
        let rendered = match env::current_dir() {
            Ok(cwd) => self.render(&cwd),
            Err(_) => self.paint(GREEN, &self.marker),
        };
        print!("{rendered}");
        let _ = io::stdout().flush();
    }

    /// Blank line, the last one or two components of `cwd`, then the marker.
    pub fn render(&self, cwd: &Path) -> String {
        format!(
            "\n{}\n{}",
            self.paint(BLUE, &short_dir(cwd)),
            self.paint(GREEN, &self.marker)
        )
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn short_dir(cwd: &Path) -> String {
    let names: Vec<String> = cwd
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    match names.as_slice() {
        [] => ROOT_MARK.to_string(),
        [only] => only.clone(),
        [.., parent, last] => format!("{parent}/{last}"),
    }
}
