use crate::{
    core::{
        commands::{CommandExecutor, Flow},
        config::{Config, ConfigPaths},
        state::ShellState,
    },
    error::ShellError,
    flags::Flags,
    input::{self, LineReader, ReadOutcome},
    logging,
    process::{self, ForegroundOnly, SignalPolicy},
};

mod executor;

use executor::CommandHandler;

pub struct Shell {
    pub(crate) reader: Box<dyn LineReader>,
    pub(crate) executor: CommandExecutor,
    pub(crate) state: ShellState,
    pub(crate) config: Config,
    pub(crate) flags: Flags,
    pub(crate) pid: String,
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        let paths = match flags.get_value("config") {
            Some(path) => ConfigPaths::explicit(path),
            None => ConfigPaths::new(),
        };
        let config = Config::load(&paths)?;
        logging::init(&config, flags.is_set("debug"))?;
        for key in &config.ignored_keys {
            log::debug!("ignoring unknown config key {}", key);
        }

        let foreground_only = ForegroundOnly::new(config.foreground_only);
        SignalPolicy::interpreter().install(&foreground_only)?;

        let reader = input::stdin_reader()?;
        Ok(Self::with_reader(reader, config, flags, foreground_only))
    }

    /// Assembles a shell around an existing line source. Signal dispositions
    /// are left untouched.
    pub fn with_reader(
        reader: Box<dyn LineReader>,
        config: Config,
        flags: Flags,
        foreground_only: ForegroundOnly,
    ) -> Self {
        Shell {
            reader,
            executor: CommandExecutor::new(),
            state: ShellState::new(foreground_only),
            config,
            flags,
            pid: std::process::id().to_string(),
        }
    }

    /// Reads and dispatches lines until `exit`, end of input or a fatal
    /// error. Background children are terminated on every way out.
    pub fn run(&mut self) -> Result<(), ShellError> {
        let result = self.read_loop();
        self.shutdown();
        result
    }

    fn read_loop(&mut self) -> Result<(), ShellError> {
        loop {
            match self.reader.read_line(&self.config.prompt) {
                Ok(ReadOutcome::Line(line)) => {
                    if self.execute_line(&line)? == Flow::Exit {
                        return Ok(());
                    }
                }
                // The interpreter itself never reacts to an interrupt.
                Ok(ReadOutcome::Interrupted) => continue,
                Ok(ReadOutcome::Eof) => {
                    log::debug!("end of input");
                    return Ok(());
                }
                Err(ShellError::Readline(e)) => {
                    if !self.flags.is_set("quiet") {
                        eprintln!("Error: {}", e);
                    }
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    fn shutdown(&mut self) {
        let terminated = process::terminate_background(&mut self.state);
        log::info!("exiting, {} background children terminated", terminated);
    }
}
