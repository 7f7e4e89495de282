use std::collections::BTreeMap;
use std::io::Write;

mod cd;
mod exit;
mod status;

pub use cd::CdCommand;
pub use exit::ExitCommand;
pub use status::StatusCommand;

use crate::core::state::ShellState;
use crate::parser::Command;
use crate::process::{ChildReaper, Launcher, ProcessError, WaitAny};

#[derive(Debug)]
pub enum CommandError {
    NoSuchDirectory(String),
    HomeDirNotFound,
    IoError(std::io::Error),
    ProcessError(ProcessError),
}

impl CommandError {
    /// User mistakes that are reported and then forgotten.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CommandError::NoSuchDirectory(_) | CommandError::HomeDirNotFound
        )
    }

    /// Only running out of processes ends the interpreter.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::ProcessError(ProcessError::Spawn(_)))
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::NoSuchDirectory(_) => write!(f, "no such directory exists"),
            CommandError::HomeDirNotFound => write!(f, "home directory not found"),
            CommandError::IoError(err) => write!(f, "IO error: {}", err),
            CommandError::ProcessError(err) => write!(f, "Process error: {}", err),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::IoError(err)
    }
}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        CommandError::ProcessError(err)
    }
}

/// What the dispatcher does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A command the interpreter runs itself, without a child process.
pub trait Builtin {
    fn execute(
        &self,
        args: &[String],
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError>;
}

#[derive(Clone)]
enum BuiltinType {
    Cd(CdCommand),
    Status(StatusCommand),
    Exit(ExitCommand),
}

impl Builtin for BuiltinType {
    fn execute(
        &self,
        args: &[String],
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        match self {
            BuiltinType::Cd(cmd) => cmd.execute(args, state, out),
            BuiltinType::Status(cmd) => cmd.execute(args, state, out),
            BuiltinType::Exit(cmd) => cmd.execute(args, state, out),
        }
    }
}

/// Routes a parsed line to a built-in or to the launcher.
pub struct CommandExecutor<R = WaitAny> {
    commands: BTreeMap<&'static str, BuiltinType>,
    launcher: Launcher<R>,
}

impl Default for CommandExecutor<WaitAny> {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor<WaitAny> {
    pub fn new() -> Self {
        Self::with_launcher(Launcher::new())
    }
}

impl<R: ChildReaper> CommandExecutor<R> {
    pub fn with_launcher(launcher: Launcher<R>) -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd", BuiltinType::Cd(CdCommand::new()));
        commands.insert("status", BuiltinType::Status(StatusCommand));
        commands.insert("exit", BuiltinType::Exit(ExitCommand));
        Self { commands, launcher }
    }

    /// Built-ins ignore redirection and the background marker.
    pub fn execute(
        &mut self,
        cmd: &Command,
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        if cmd.is_noop() {
            return Ok(Flow::Continue);
        }
        if let Some(builtin) = self.commands.get(cmd.program.as_str()) {
            return builtin.execute(cmd.args(), state, out);
        }
        self.launcher.launch(cmd, state, out)?;
        Ok(Flow::Continue)
    }

    pub fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }
}
