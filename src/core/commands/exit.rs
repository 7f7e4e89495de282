use std::io::Write;

use super::{Builtin, CommandError, Flow};
use crate::core::state::ShellState;

/// Ends the read loop. Leftover background children are dealt with by the
/// shell on the way out.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExitCommand;

impl Builtin for ExitCommand {
    fn execute(
        &self,
        _args: &[String],
        _state: &mut ShellState,
        _out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        Ok(Flow::Exit)
    }
}
