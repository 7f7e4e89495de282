use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::process;

use libc::{c_char, c_int};

use super::reaper::{reap_sweep, ChildReaper, WaitAny};
use super::signal::SignalPolicy;
use super::{JobStatus, ProcessError, EXEC_FAILURE_CODE, REDIRECT_FAILURE_CODE};
use crate::core::state::ShellState;
use crate::parser::Command;

/// Standard input of background commands that did not ask for one.
pub const NULL_DEVICE: &str = "/dev/null";

const OUTPUT_MODE: libc::mode_t = 0o644;

/// A redirection the child performs on itself before exec.
struct Redirect {
    path: CString,
    flags: c_int,
    target: c_int,
    diagnostic: Vec<u8>,
}

impl Redirect {
    fn input(path: &str) -> Result<Self, ProcessError> {
        Ok(Self {
            path: c_string(path)?,
            flags: libc::O_RDONLY,
            target: libc::STDIN_FILENO,
            diagnostic: format!("cannot open {} for input\n", path).into_bytes(),
        })
    }

    fn output(path: &str) -> Result<Self, ProcessError> {
        Ok(Self {
            path: c_string(path)?,
            flags: libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            target: libc::STDOUT_FILENO,
            diagnostic: format!("cannot open {} for output\n", path).into_bytes(),
        })
    }

    /// Runs in the child. Exits with the redirection failure code when the
    /// file cannot be opened.
    fn apply(&self) {
        unsafe {
            let fd = libc::open(self.path.as_ptr(), self.flags, OUTPUT_MODE as libc::c_uint);
            if fd == -1 {
                write_all(libc::STDERR_FILENO, &self.diagnostic);
                libc::_exit(REDIRECT_FAILURE_CODE);
            }
            if fd != self.target {
                libc::dup2(fd, self.target);
                libc::close(fd);
            }
        }
    }
}

/// Everything the child needs after fork, allocated up front so the child
/// only makes raw system calls.
struct ExecImage {
    program: CString,
    // Owns the strings `argv` points into.
    _arguments: Vec<CString>,
    argv: Vec<*const c_char>,
    redirects: Vec<Redirect>,
    policy: SignalPolicy,
    not_found: Vec<u8>,
}

// The raw pointers only point into `_arguments`, which moves together with them.
unsafe impl Send for ExecImage {}
unsafe impl Sync for ExecImage {}

impl ExecImage {
    fn new(cmd: &Command, background: bool) -> Result<Self, ProcessError> {
        let arguments = cmd
            .arguments
            .iter()
            .map(|arg| c_string(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let mut argv: Vec<*const c_char> = arguments.iter().map(|arg| arg.as_ptr()).collect();
        argv.push(std::ptr::null());

        let mut redirects = Vec::new();
        match (&cmd.input_path, background) {
            (Some(path), _) => redirects.push(Redirect::input(path)?),
            (None, true) => redirects.push(Redirect::input(NULL_DEVICE)?),
            (None, false) => {}
        }
        if let Some(path) = &cmd.output_path {
            redirects.push(Redirect::output(path)?);
        }

        Ok(Self {
            program: c_string(&cmd.program)?,
            _arguments: arguments,
            argv,
            redirects,
            policy: SignalPolicy::for_child(background),
            not_found: format!("{}: no such file or directory\n", cmd.program).into_bytes(),
        })
    }

    /// Runs in the child between fork and exec and never returns on success.
    /// A program that cannot be executed ends the child with the exec failure
    /// code, so the interpreter sees it like any other exit status.
    fn exec(&self) -> io::Result<()> {
        self.policy.apply_in_child()?;
        for redirect in &self.redirects {
            redirect.apply();
        }
        unsafe {
            libc::execvp(self.program.as_ptr(), self.argv.as_ptr());
            write_all(libc::STDOUT_FILENO, &self.not_found);
            libc::_exit(EXEC_FAILURE_CODE)
        }
    }
}

fn c_string(s: &str) -> Result<CString, ProcessError> {
    CString::new(s).map_err(|_| ProcessError::Other(format!("{:?} contains a NUL byte", s)))
}

fn write_all(fd: c_int, mut buf: &[u8]) {
    while !buf.is_empty() {
        let written = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        if written <= 0 {
            return;
        }
        buf = &buf[written as usize..];
    }
}

/// Runs external programs on behalf of the dispatcher.
pub struct Launcher<R = WaitAny> {
    reaper: R,
}

impl Default for Launcher<WaitAny> {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher<WaitAny> {
    pub fn new() -> Self {
        Self { reaper: WaitAny }
    }
}

impl<R: ChildReaper> Launcher<R> {
    pub fn with_reaper(reaper: R) -> Self {
        Self { reaper }
    }

    /// Spawns `cmd`, waits for it unless it runs in background, then sweeps
    /// finished background children.
    ///
    /// Redirection and exec happen in the child, so their failures come back
    /// as the child's exit status. Only a failure to create a process at all
    /// is returned as [`ProcessError::Spawn`].
    pub fn launch(
        &mut self,
        cmd: &Command,
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<(), ProcessError> {
        let background = cmd.background && !state.foreground_only();
        if cmd.background && !background {
            log::debug!("foreground-only mode: running {} in foreground", cmd.program);
        }

        let image = ExecImage::new(cmd, background)?;
        out.flush()?;
        let mut command = process::Command::new(&cmd.program);
        unsafe {
            command.pre_exec(move || image.exec());
        }
        let mut child = command.spawn().map_err(ProcessError::Spawn)?;
        let pid = child.id();

        if background {
            state.track_background(pid);
            log::debug!("started background child {} ({})", pid, cmd.program);
            writeln!(out, "background pid is {}", pid)?;
            out.flush()?;
        } else {
            log::debug!("waiting for foreground child {} ({})", pid, cmd.program);
            let status = JobStatus::from(child.wait().map_err(ProcessError::Wait)?);
            log::debug!("foreground child {} finished: {}", pid, status);
            state.set_last_exit_status(status);
        }

        reap_sweep(&mut self.reaper, state, out).map_err(ProcessError::Wait)?;
        Ok(())
    }
}
