use std::io::{self, Write};

use libc::{c_int, pid_t};

use super::JobStatus;
use crate::core::state::ShellState;

/// Source of already-terminated children.
pub trait ChildReaper {
    /// Returns one terminated child without blocking, or `None` when no child
    /// has finished.
    fn try_reap(&mut self) -> io::Result<Option<(u32, JobStatus)>>;
}

/// Polls the OS for any terminated child with `waitpid(-1, WNOHANG)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitAny;

impl ChildReaper for WaitAny {
    fn try_reap(&mut self) -> io::Result<Option<(u32, JobStatus)>> {
        loop {
            let mut status: c_int = 0;
            let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
            match pid {
                0 => return Ok(None),
                -1 => {
                    let err = io::Error::last_os_error();
                    match err.raw_os_error() {
                        Some(libc::EINTR) => continue,
                        Some(libc::ECHILD) => return Ok(None),
                        _ => return Err(err),
                    }
                }
                pid => return Ok(Some((pid as u32, JobStatus::from_raw(status)))),
            }
        }
    }
}

/// Reports every child that has terminated since the last sweep.
///
/// Never waits for a running child and never changes `last_exit_status`.
pub fn reap_sweep<R: ChildReaper + ?Sized>(
    reaper: &mut R,
    state: &mut ShellState,
    out: &mut dyn Write,
) -> io::Result<usize> {
    let mut reaped = 0;
    while let Some((pid, status)) = reaper.try_reap()? {
        state.forget_background(pid);
        log::debug!("reaped child {}: {}", pid, status);
        writeln!(out, "child pid: {}, has been terminated", pid)?;
        writeln!(out, "{}", status)?;
        out.flush()?;
        reaped += 1;
    }
    Ok(reaped)
}

/// Sends SIGTERM to every tracked background child and reaps it silently.
pub fn terminate_background(state: &mut ShellState) -> usize {
    let pids = state.take_background();
    for &pid in &pids {
        let pid = pid as pid_t;
        if unsafe { libc::kill(pid, libc::SIGTERM) } == -1 {
            log::debug!("kill({}) failed: {}", pid, io::Error::last_os_error());
            continue;
        }
        let mut status: c_int = 0;
        while unsafe { libc::waitpid(pid, &mut status, 0) } == -1 {
            if io::Error::last_os_error().raw_os_error() != Some(libc::EINTR) {
                break;
            }
        }
        log::debug!("terminated background child {}", pid);
    }
    pids.len()
}
