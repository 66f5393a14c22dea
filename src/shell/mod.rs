use std::io::{self, IsTerminal};

use tracing::{debug, warn};

mod executor;
mod reader;
pub mod tokenizer;

use crate::{
    core::{
        commands::{CommandExecutor, Status},
        config::Config,
        state::ShellState,
    },
    error::ShellError,
    flags::Flags,
    highlight::SyntaxHighlighter,
    process::JobControl,
};

use executor::CommandHandler;
use reader::{Line, LineReader};

pub struct Shell {
    pub(crate) config: Config,
    pub(crate) flags: Flags,
    pub(crate) executor: CommandExecutor,
    pub(crate) jobs: JobControl,
    pub(crate) highlighter: SyntaxHighlighter,
    /// Status of the last command, as `$?` would report it.
    pub(crate) last_status: i32,
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        let state = ShellState::init()?;
        debug!(
            "interactive: {}, shell pgid: {}",
            state.is_interactive(),
            state.shell_pgid()
        );

        let mut config = Config::new(flags.config.clone());
        if let Err(e) = config.load() {
            warn!("rc file skipped: {}", e);
        }

        Ok(Shell {
            config,
            flags,
            executor: CommandExecutor::new(),
            jobs: JobControl::new(state),
            highlighter: SyntaxHighlighter::for_stream(io::stderr().is_terminal()),
            last_status: 0,
        })
    }

    /// Read and run lines until end of input or `exit`.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        let interactive = self.jobs.state().is_interactive();
        let mut reader = LineReader::new(interactive, self.config.history_path())?;
        let mut line_num = 0usize;

        let code = loop {
            let prompt = format!("{}: ", line_num);
            let line = match reader.read_line(&prompt) {
                Ok(Line::Input(line)) => line,
                Ok(Line::Interrupted) => continue,
                Ok(Line::Undecodable) => {
                    line_num += 1;
                    self.last_status = 1;
                    continue;
                }
                Ok(Line::Eof) => break 0,
                Err(e) => {
                    self.report(&e);
                    break 1;
                }
            };
            line_num += 1;

            if let Status::Exit(code) = self.run_line(&line) {
                break code;
            }
        };

        reader.save_history();
        self.shutdown();
        Ok(code)
    }

    /// Run one line and report the status it finished with.
    pub fn run_command(&mut self, line: &str) -> i32 {
        let code = match self.run_line(line) {
            Status::Exit(code) => code,
            Status::Continue => self.last_status,
        };
        self.shutdown();
        code
    }

    fn run_line(&mut self, line: &str) -> Status {
        match self.execute_line(line) {
            Ok(status) => status,
            Err(e) => {
                self.last_status = 1;
                self.report(&e);
                Status::Continue
            }
        }
    }

    fn report(&self, error: &ShellError) {
        eprintln!(
            "{}",
            self.highlighter.highlight_error(&format!("husk: {}", error))
        );
    }

    fn shutdown(&self) {
        if let Err(e) = self.jobs.shutdown() {
            warn!("failed to restore terminal mode: {}", e);
        }
    }
}
