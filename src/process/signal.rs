use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libc::{c_int, sighandler_t, SIGINT, SIGTSTP, SIG_DFL, SIG_ERR, SIG_IGN};

use crate::process::ProcessError;

pub const ENABLED_NOTICE: &str = "Foreground-only mode enabled\n";
pub const DISABLED_NOTICE: &str = "Foreground-only mode disabled\n";

/// The two signals the interpreter has an opinion about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// SIGINT, usually Ctrl-C.
    Interrupt,
    /// SIGTSTP, usually Ctrl-Z. Flips foreground-only mode in the interpreter.
    ModeToggle,
}

impl SignalKind {
    pub const ALL: [SignalKind; 2] = [SignalKind::Interrupt, SignalKind::ModeToggle];

    pub fn signo(self) -> c_int {
        match self {
            SignalKind::Interrupt => SIGINT,
            SignalKind::ModeToggle => SIGTSTP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Default,
    Ignore,
    /// Flip foreground-only mode and announce the new state.
    ToggleForegroundOnly,
}

/// Foreground-only mode flag, shared between the dispatcher and the
/// SIGTSTP handler.
#[derive(Debug, Clone, Default)]
pub struct ForegroundOnly(Arc<AtomicBool>);

impl ForegroundOnly {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Flips the mode and returns the new value. Async-signal-safe.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn notice(enabled: bool) -> &'static str {
        if enabled {
            ENABLED_NOTICE
        } else {
            DISABLED_NOTICE
        }
    }
}

/// Signal dispositions for one kind of process: the interpreter itself, a
/// foreground child or a background child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalPolicy {
    interrupt: Disposition,
    mode_toggle: Disposition,
}

impl SignalPolicy {
    pub const fn interpreter() -> Self {
        Self {
            interrupt: Disposition::Ignore,
            mode_toggle: Disposition::ToggleForegroundOnly,
        }
    }

    // Children ignore SIGTSTP rather than inheriting the interpreter's
    // handler, which exec would reset to the default stop action and leave
    // the interpreter waiting on a stopped foreground child.
    pub const fn foreground_child() -> Self {
        Self {
            interrupt: Disposition::Default,
            mode_toggle: Disposition::Ignore,
        }
    }

    pub const fn background_child() -> Self {
        Self {
            interrupt: Disposition::Ignore,
            mode_toggle: Disposition::Ignore,
        }
    }

    pub fn for_child(background: bool) -> Self {
        if background {
            Self::background_child()
        } else {
            Self::foreground_child()
        }
    }

    pub fn disposition(&self, kind: SignalKind) -> Disposition {
        match kind {
            SignalKind::Interrupt => self.interrupt,
            SignalKind::ModeToggle => self.mode_toggle,
        }
    }

    /// Installs the policy in the current process. Called once at startup.
    pub fn install(&self, mode: &ForegroundOnly) -> Result<(), ProcessError> {
        for kind in SignalKind::ALL {
            let result = match self.disposition(kind) {
                Disposition::Default => set_raw(kind.signo(), SIG_DFL),
                Disposition::Ignore => set_raw(kind.signo(), SIG_IGN),
                Disposition::ToggleForegroundOnly => register_toggle(kind.signo(), mode.clone()),
            };
            result.map_err(|e| ProcessError::SignalError(format!("{:?}: {}", kind, e)))?;
            log::debug!("{:?} disposition set to {:?}", kind, self.disposition(kind));
        }
        Ok(())
    }

    /// Applies the policy between fork and exec.
    ///
    /// Only touches `signal(2)`, so it is safe to call from a `pre_exec` hook.
    /// Handlers cannot survive exec and are refused.
    pub fn apply_in_child(&self) -> io::Result<()> {
        for kind in SignalKind::ALL {
            match self.disposition(kind) {
                Disposition::Default => set_raw(kind.signo(), SIG_DFL)?,
                Disposition::Ignore => set_raw(kind.signo(), SIG_IGN)?,
                Disposition::ToggleForegroundOnly => {
                    return Err(io::Error::from_raw_os_error(libc::EINVAL))
                }
            }
        }
        Ok(())
    }
}

fn set_raw(signo: c_int, handler: sighandler_t) -> io::Result<()> {
    let previous = unsafe { libc::signal(signo, handler) };
    if previous == SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn register_toggle(signo: c_int, mode: ForegroundOnly) -> io::Result<()> {
    let action = move || {
        let notice = ForegroundOnly::notice(mode.toggle());
        // write(2) is unbuffered, so the line is out as soon as this returns.
        unsafe {
            libc::write(libc::STDOUT_FILENO, notice.as_ptr().cast(), notice.len());
        }
    };
    unsafe { signal_hook::low_level::register(signo, action) }.map(|_| ())
}
