use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::environment::{SearchPath, DEFAULT_SEARCH_PATH};

pub const DEFAULT_PROMPT: &str = "ansh-> ";
pub const DEFAULT_BANNER: &str = "Welcome to ansh shell, the interactive friendly shell by An";
pub const DEFAULT_MAX_LINE_LEN: usize = 200;

/// Startup settings. Read once; nothing here is ever written back.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub banner: String,
    pub search_path: Vec<PathBuf>,
    pub max_line_len: usize,
    pub color: ColorChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl Config {
    pub fn initial_search_path(&self) -> SearchPath {
        SearchPath::new(self.search_path.iter().cloned())
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            banner: DEFAULT_BANNER.to_string(),
            search_path: DEFAULT_SEARCH_PATH.iter().copied().map(PathBuf::from).collect(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            color: ColorChoice::Auto,
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let src = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::load_from_str(&src)
    }

    /// `key = value` lines; blank lines and `#` comments are skipped.
    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let lineno = lineno + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(parse_error(lineno, format!("no '=' found: {line}")));
            };
            let value = value.trim();

            match key.trim() {
                // Quote the value to keep trailing blanks: `prompt = "$ "`.
                "prompt" => config.prompt = unquote(value).to_string(),
                "banner" => config.banner = unquote(value).to_string(),
                "path" => {
                    config.search_path = value.split_whitespace().map(PathBuf::from).collect()
                }
                "max_line_len" => {
                    config.max_line_len = match value.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => {
                            return Err(parse_error(lineno, format!("invalid max_line_len: {value}")));
                        }
                    }
                }
                "color" => {
                    config.color = match value {
                        "auto" => ColorChoice::Auto,
                        "always" => ColorChoice::Always,
                        "never" => ColorChoice::Never,
                        _ => return Err(parse_error(lineno, format!("invalid color: {value}"))),
                    }
                }
                other => return Err(parse_error(lineno, format!("unknown key: {other}"))),
            }
        }

        Ok(config)
    }
}

fn parse_error(lineno: usize, msg: String) -> ConfigError {
    ConfigError::Parse(format!("line {lineno}: {msg}"))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(String),
}
