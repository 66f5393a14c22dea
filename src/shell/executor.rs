use tracing::debug;

use super::tokenizer::tokenize;
use crate::core::commands::{CommandError, Status};
use crate::error::ShellError;
use crate::process::{Command, JobStatus, LaunchOutcome, ParseError};

pub(crate) trait CommandHandler {
    fn execute_line(&mut self, line: &str) -> Result<Status, ShellError>;
}

impl CommandHandler for super::Shell {
    fn execute_line(&mut self, line: &str) -> Result<Status, ShellError> {
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(Status::Continue);
        }

        self.jobs.prepare_dispatch()?;

        let command = match Command::parse(&tokens) {
            Ok(command) => command,
            Err(ParseError::EmptyCommand) => return Ok(Status::Continue),
            Err(e) => return Err(e.into()),
        };

        if self.executor.is_builtin(command.name()) {
            if command.background() {
                return Err(CommandError::InvalidArguments(format!(
                    "{}: builtins cannot run in the background",
                    command.name()
                ))
                .into());
            }
            let _redirect = command.redirection().scoped()?;
            if let Some(result) =
                self.executor
                    .execute(command.name(), &command.argv()[1..], &mut self.jobs)
            {
                let status = result?;
                self.last_status = 0;
                return Ok(status);
            }
        }

        match self.jobs.launch(&command)? {
            LaunchOutcome::Completed(status) => {
                debug!("{} finished: {:?}", command.name(), status);
                if let JobStatus::Signaled(signal) = status {
                    if !self.flags.quiet {
                        eprintln!("{}: terminated by {}", command.name(), signal);
                    }
                }
                self.last_status = status.code();
            }
            LaunchOutcome::Detached(job) => {
                if self.jobs.state().is_interactive() && !self.flags.quiet {
                    println!("[{}] {}", self.jobs.state().background_count(), job.pid());
                }
                self.last_status = 0;
            }
        }
        Ok(Status::Continue)
    }
}
