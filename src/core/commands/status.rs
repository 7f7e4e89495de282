use std::io::Write;

use super::{Builtin, CommandError, Flow};
use crate::core::state::ShellState;

#[derive(Clone, Copy, Debug, Default)]
pub struct StatusCommand;

impl Builtin for StatusCommand {
    fn execute(
        &self,
        _args: &[String],
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        writeln!(out, "{}", state.last_exit_status())?;
        out.flush()?;
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::JobStatus;

    fn status_line(status: JobStatus) -> String {
        let mut state = ShellState::default();
        state.set_last_exit_status(status);
        let mut out: Vec<u8> = Vec::new();
        StatusCommand.execute(&[], &mut state, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_exit_value() {
        assert_eq!(status_line(JobStatus::Exited(3)), "exit value 3\n");
    }

    #[test]
    fn test_terminating_signal() {
        assert_eq!(status_line(JobStatus::Signaled(2)), "terminated by signal 2\n");
    }
}
