use std::collections::BTreeMap;

use thiserror::Error;

mod builtin;
mod cd;
mod pwd;
mod wait;

pub use builtin::{ExitCommand, HelpCommand};
pub use cd::CdCommand;
pub use pwd::PwdCommand;
pub use wait::WaitCommand;

use crate::process::{JobControl, ProcessError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{0}")]
    ExecutionError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ProcessError(#[from] ProcessError),
}

/// What the read loop does after a builtin returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Continue,
    Exit(i32),
}

pub trait Builtin {
    fn execute(&self, args: &[String], jobs: &mut JobControl) -> Result<Status, CommandError>;
}

/// Name and one-line description of every builtin, in help order.
pub const BUILTINS: [(&str, &str); 5] = [
    ("?", "show this help menu"),
    ("exit", "exit the command shell"),
    ("pwd", "print the current working directory"),
    ("cd", "change the current working directory"),
    ("wait", "wait for all background jobs to finish"),
];

#[derive(Clone)]
enum CommandType {
    Help(HelpCommand),
    Exit(ExitCommand),
    Pwd(PwdCommand),
    Cd(CdCommand),
    Wait(WaitCommand),
}

impl Builtin for CommandType {
    fn execute(&self, args: &[String], jobs: &mut JobControl) -> Result<Status, CommandError> {
        match self {
            CommandType::Help(cmd) => cmd.execute(args, jobs),
            CommandType::Exit(cmd) => cmd.execute(args, jobs),
            CommandType::Pwd(cmd) => cmd.execute(args, jobs),
            CommandType::Cd(cmd) => cmd.execute(args, jobs),
            CommandType::Wait(cmd) => cmd.execute(args, jobs),
        }
    }
}

/// Fixed dispatch table consulted before anything is launched.
#[derive(Clone)]
pub struct CommandExecutor {
    commands: BTreeMap<&'static str, CommandType>,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("?", CommandType::Help(HelpCommand::new()));
        commands.insert("exit", CommandType::Exit(ExitCommand::new()));
        commands.insert("pwd", CommandType::Pwd(PwdCommand::new()));
        commands.insert("cd", CommandType::Cd(CdCommand::new()));
        commands.insert("wait", CommandType::Wait(WaitCommand::new()));
        Self { commands }
    }

    pub fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// Run `command` if it is a builtin; `None` means the caller should
    /// launch it as a program instead.
    pub fn execute(
        &self,
        command: &str,
        args: &[String],
        jobs: &mut JobControl,
    ) -> Option<Result<Status, CommandError>> {
        self.commands
            .get(command)
            .map(|builtin| builtin.execute(args, jobs))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::state::ShellState;
    use nix::unistd::getpgrp;

    pub(crate) fn detached_jobs() -> JobControl {
        JobControl::new(ShellState::new(false, libc::STDIN_FILENO, getpgrp()))
    }

    #[test]
    fn test_table_matches_help() {
        let executor = CommandExecutor::new();
        for (name, _) in BUILTINS {
            assert!(executor.is_builtin(name), "{name} missing from table");
        }
        assert!(!executor.is_builtin("ls"));
    }

    #[test]
    fn test_unknown_command_falls_through() {
        let executor = CommandExecutor::new();
        let mut jobs = detached_jobs();
        assert!(executor.execute("sort", &[], &mut jobs).is_none());
    }

    #[test]
    fn test_exit_stops_loop() {
        let executor = CommandExecutor::new();
        let mut jobs = detached_jobs();
        let status = executor
            .execute("exit", &[], &mut jobs)
            .expect("builtin")
            .expect("exit");
        assert_eq!(status, Status::Exit(0));
    }

    #[test]
    fn test_wait_without_jobs_returns() {
        let executor = CommandExecutor::new();
        let mut jobs = detached_jobs();
        let status = executor
            .execute("wait", &[], &mut jobs)
            .expect("builtin")
            .expect("wait");
        assert_eq!(status, Status::Continue);
        assert_eq!(jobs.state().background_count(), 0);
    }
}
