use std::fs::OpenOptions;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::core::config::Config;
use crate::error::ShellError;

pub const DEFAULT_LOG_FILE: &str = ".smallsh.log";

/// Where log records go, if anywhere. Never the terminal: stdout belongs to
/// commands and the interpreter's fixed messages.
pub fn log_target(config: &Config, debug: bool) -> Option<(PathBuf, LevelFilter)> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        config.log_level
    };
    match (&config.log_file, debug) {
        (Some(path), _) => Some((path.clone(), level)),
        (None, true) => dirs::home_dir()
            .or_else(|| Some(std::env::temp_dir()))
            .map(|dir| (dir.join(DEFAULT_LOG_FILE), level)),
        (None, false) => None,
    }
}

/// Installs a file logger. A no-op when logging is not configured.
pub fn init(config: &Config, debug: bool) -> Result<(), ShellError> {
    let Some((path, level)) = log_target(config, debug) else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let log_config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, log_config, file)?;
    log::info!("smallsh {} started, pid {}", env!("CARGO_PKG_VERSION"), std::process::id());
    Ok(())
}
