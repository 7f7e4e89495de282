use std::collections::BTreeSet;

use crate::process::{ForegroundOnly, JobStatus};

/// Interpreter state that outlives a single input line.
#[derive(Debug, Clone, Default)]
pub struct ShellState {
    last_exit_status: JobStatus,
    foreground_only: ForegroundOnly,
    background_jobs: BTreeSet<u32>,
}

impl ShellState {
    pub fn new(foreground_only: ForegroundOnly) -> Self {
        Self {
            foreground_only,
            ..Self::default()
        }
    }

    /// Status of the most recent foreground command.
    pub fn last_exit_status(&self) -> JobStatus {
        self.last_exit_status
    }

    pub fn set_last_exit_status(&mut self, status: JobStatus) {
        self.last_exit_status = status;
    }

    /// Read fresh every time, since the SIGTSTP handler may flip it at any point.
    pub fn foreground_only(&self) -> bool {
        self.foreground_only.is_enabled()
    }

    pub fn foreground_only_flag(&self) -> &ForegroundOnly {
        &self.foreground_only
    }

    pub fn track_background(&mut self, pid: u32) {
        self.background_jobs.insert(pid);
    }

    pub fn forget_background(&mut self, pid: u32) -> bool {
        self.background_jobs.remove(&pid)
    }

    pub fn background_jobs(&self) -> &BTreeSet<u32> {
        &self.background_jobs
    }

    pub(crate) fn take_background(&mut self) -> BTreeSet<u32> {
        std::mem::take(&mut self.background_jobs)
    }
}
