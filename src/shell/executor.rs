use std::io::{self, Write};

use crate::core::commands::{CommandError, Flow};
use crate::error::ShellError;
use crate::parser;

pub(crate) trait CommandHandler {
    fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError>;
}

impl CommandHandler for super::Shell {
    fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        // A fresh Command per line, so redirections and `&` never carry over.
        let command = parser::parse(line, &self.pid);
        if command.is_noop() {
            return Ok(Flow::Continue);
        }
        log::debug!("dispatching {:?}", command.arguments);

        let mut out = io::stdout().lock();
        let result = self.executor.execute(&command, &mut self.state, &mut out);
        settle(result, &mut out)
    }
}

/// Decides whether a command's outcome keeps the loop going. User mistakes
/// are printed to `out`, other non-fatal failures are logged and printed to
/// stderr.
pub(crate) fn settle(
    result: Result<Flow, CommandError>,
    out: &mut dyn Write,
) -> Result<Flow, ShellError> {
    let err = match result {
        Ok(flow) => return Ok(flow),
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => e,
    };

    let reported = if err.is_recoverable() {
        writeln!(out, "{}", err).and_then(|_| out.flush())
    } else {
        log::warn!("command failed: {}", err);
        writeln!(io::stderr(), "smallsh: {}", err)
    };
    if let Err(e) = reported {
        log::warn!("could not report {:?}: {}", err, e);
    }
    Ok(Flow::Continue)
}
