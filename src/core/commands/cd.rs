use std::env;
use std::io::Write;
use std::path::PathBuf;

use super::{Builtin, CommandError, Flow};
use crate::core::state::ShellState;

#[derive(Clone, Debug, Default)]
pub struct CdCommand;

impl CdCommand {
    pub fn new() -> Self {
        Self
    }

    /// The first argument, or the home directory when there is none.
    pub fn target(&self, args: &[String]) -> Result<PathBuf, CommandError> {
        match args.first() {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => dirs::home_dir().ok_or(CommandError::HomeDirNotFound),
        }
    }
}

impl Builtin for CdCommand {
    fn execute(
        &self,
        args: &[String],
        _state: &mut ShellState,
        _out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        let target = self.target(args)?;
        env::set_current_dir(&target).map_err(|e| {
            log::debug!("cd {}: {}", target.display(), e);
            CommandError::NoSuchDirectory(target.display().to_string())
        })?;
        Ok(Flow::Continue)
    }
}
