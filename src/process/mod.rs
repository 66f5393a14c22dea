use std::ffi::NulError;
use std::path::PathBuf;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use thiserror::Error;

pub mod command;
pub mod job;
pub mod job_control;
pub mod launcher;
pub mod redirect;
pub mod resolver;
pub mod signal;
pub mod terminal;

pub use command::{Command, ParseError, Redirection};
pub use redirect::ScopedRedirect;
pub use job::{Job, JobMode, JobStatus};
pub use job_control::{JobControl, LaunchOutcome};
pub use resolver::SearchPath;
pub use signal::{apply_signal_policy, SignalPolicy};
pub use terminal::{ForegroundGuard, TerminalControl, Tty};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to create process: {0}")]
    Fork(#[source] Errno),
    #[error("{name}: executable not found or not runnable: {source}")]
    NotFound {
        name: String,
        #[source]
        source: Errno,
    },
    #[error("{}: cannot open for redirection: {source}", .path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to replace descriptor {fd}: {source}")]
    Descriptor {
        fd: i32,
        #[source]
        source: Errno,
    },
    #[error("failed to set disposition for {signal}: {source}")]
    Signal {
        signal: Signal,
        #[source]
        source: Errno,
    },
    #[error("failed to set process group: {0}")]
    ProcessGroup(#[source] Errno),
    #[error("terminal control failed: {0}")]
    Terminal(#[source] Errno),
    #[error("failed to wait for job: {0}")]
    Wait(#[source] Errno),
    #[error("argument contains a NUL byte")]
    Nul(#[from] NulError),
}

impl ProcessError {
    /// Status a forked child exits with when it cannot become the requested program.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::NotFound { .. } => 127,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_group_error_names_the_group() {
        let err = ProcessError::ProcessGroup(Errno::EPERM);
        assert!(err.to_string().starts_with("failed to set process group"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_not_found_exits_127() {
        let err = ProcessError::NotFound {
            name: "ls".to_string(),
            source: Errno::ENOENT,
        };
        assert_eq!(err.exit_code(), 127);
    }
}
