use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

pub mod launcher;
pub mod reaper;
pub mod signal;

pub use launcher::Launcher;
pub use reaper::{reap_sweep, terminate_background, ChildReaper, WaitAny};
pub use signal::{Disposition, ForegroundOnly, SignalKind, SignalPolicy};

/// Exit code of a child whose redirection target could not be opened.
pub const REDIRECT_FAILURE_CODE: i32 = 1;
/// Exit code of a child whose program could not be executed.
pub const EXEC_FAILURE_CODE: i32 = 2;

#[derive(Debug)]
pub enum ProcessError {
    Spawn(std::io::Error),
    SignalError(String),
    Wait(std::io::Error),
    Other(String),
}

impl From<std::io::Error> for ProcessError {
    fn from(e: std::io::Error) -> Self {
        ProcessError::Other(e.to_string())
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn(e) => write!(f, "cannot create process: {}", e),
            ProcessError::SignalError(msg) => write!(f, "Signal error: {}", msg),
            ProcessError::Wait(e) => write!(f, "wait failed: {}", e),
            ProcessError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}

/// How a child ended: a normal exit code or the number of the signal that
/// killed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Exited(i32),
    Signaled(i32),
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Exited(0)
    }
}

impl JobStatus {
    /// Decodes a raw `wait` status word.
    pub fn from_raw(raw: i32) -> Self {
        ExitStatus::from_raw(raw).into()
    }
}

impl From<ExitStatus> for JobStatus {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => JobStatus::Exited(code),
            (None, Some(signo)) => JobStatus::Signaled(signo),
            // Stopped/continued states are never requested from wait.
            (None, None) => JobStatus::Exited(0),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Exited(code) => write!(f, "exit value {}", code),
            JobStatus::Signaled(signo) => write!(f, "terminated by signal {}", signo),
        }
    }
}
