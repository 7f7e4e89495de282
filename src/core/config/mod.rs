use std::fmt;
use std::path::PathBuf;

use log::LevelFilter;

mod loader;
mod paths;

use loader::ConfigLoader;
pub use paths::ConfigPaths;

pub const DEFAULT_PROMPT: &str = ": ";

/// Settings read from the rc file.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub foreground_only: bool,
    /// Keys the loader did not recognize, reported once logging is up.
    pub ignored_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            log_file: None,
            log_level: LevelFilter::Info,
            foreground_only: false,
            ignored_keys: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        let mut config = Config::new();
        ConfigLoader::new(paths).load_configs(&mut config)?;
        Ok(config)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "prompt" => self.prompt = value.to_string(),
            "log_file" => self.log_file = Some(PathBuf::from(value)),
            "log_level" => self.log_level = value.parse().map_err(|_| invalid())?,
            "foreground_only" => self.foreground_only = value.parse().map_err(|_| invalid())?,
            _ => self.ignored_keys.push(key.to_string()),
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ConfigFileNotFound(String),
    InvalidLine { line: usize, content: String },
    InvalidValue { key: String, value: String },
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::InvalidLine { line, content } => {
                write!(f, "line {}: expected key = value, got {:?}", line, content)
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
