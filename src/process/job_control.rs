use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{wait, waitpid, WaitPidFlag, WaitStatus};
use tracing::{debug, warn};

use super::command::Command;
use super::job::{Job, JobMode, JobStatus};
use super::launcher::{self, Fork};
use super::resolver::SearchPath;
use super::signal::{apply_signal_policy, SignalPolicy};
use super::terminal::{ForegroundGuard, TerminalControl, Tty};
use super::ProcessError;
use crate::core::state::ShellState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A foreground job ran to completion.
    Completed(JobStatus),
    /// A background job was started and left running.
    Detached(Job),
}

/// Owns the shell state and arbitrates who holds the terminal.
pub struct JobControl<T: TerminalControl = Tty> {
    state: ShellState,
    terminal: T,
}

impl JobControl<Tty> {
    pub fn new(state: ShellState) -> Self {
        let terminal = Tty::new(state.terminal_fd());
        JobControl { state, terminal }
    }
}

impl<T: TerminalControl> JobControl<T> {
    pub fn with_terminal(state: ShellState, terminal: T) -> Self {
        JobControl { state, terminal }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    /// Called before every dispatch so terminal signals hit the foreground
    /// child and never the shell.
    pub fn prepare_dispatch(&self) -> Result<(), ProcessError> {
        apply_signal_policy(SignalPolicy::Shell)
    }

    pub fn launch(&mut self, command: &Command) -> Result<LaunchOutcome, ProcessError> {
        let mode = if command.background() {
            JobMode::Background
        } else {
            JobMode::Foreground
        };
        debug!("launching {:?} as {:?}", command.argv(), mode);

        // Everything that allocates or reads the environment happens before
        // the fork.
        let argv = command.c_argv()?;
        let path = SearchPath::from_env();

        let terminal = (mode == JobMode::Foreground && self.state.is_interactive())
            .then_some(&self.terminal);
        let job = match launcher::fork_job(mode)? {
            Fork::Child => launcher::exec_child(command, &argv, &path, terminal),
            Fork::Parent(job) => job,
        };

        match mode {
            JobMode::Foreground => self.run_foreground(job).map(LaunchOutcome::Completed),
            JobMode::Background => {
                self.state.record_background();
                debug!(
                    "background pid {}, {} running",
                    job.pid(),
                    self.state.background_count()
                );
                Ok(LaunchOutcome::Detached(job))
            }
        }
    }

    fn run_foreground(&mut self, job: Job) -> Result<JobStatus, ProcessError> {
        let _guard = self.state.is_interactive().then(|| {
            ForegroundGuard::hand_over(&self.terminal, job.pgid(), self.state.shell_pgid())
        });
        wait_for(job)
    }

    /// Reap background jobs in completion order until none are left.
    /// Returns how many were reaped.
    pub fn wait_background(&mut self) -> Result<usize, ProcessError> {
        let mut reaped = 0;
        while self.state.background_count() > 0 {
            match wait() {
                Ok(status) => {
                    debug!("reaped {:?}", status);
                    self.state.record_reaped();
                    reaped += 1;
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => {
                    warn!(
                        "{} background jobs were already collected",
                        self.state.background_count()
                    );
                    self.state.forget_background();
                }
                Err(e) => return Err(ProcessError::Wait(e)),
            }
        }
        Ok(reaped)
    }

    /// Teardown counterpart of [`ShellState::init`].
    pub fn shutdown(&self) -> Result<(), ProcessError> {
        self.state.restore()
    }
}

/// Wait until the job ends. Jobs cannot be suspended, so a stopped job is
/// continued right away instead of leaving the shell blocked on it.
fn wait_for(job: Job) -> Result<JobStatus, ProcessError> {
    loop {
        match waitpid(job.pid(), Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(JobStatus::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(JobStatus::Signaled(signal)),
            Ok(WaitStatus::Stopped(_, signal)) => {
                warn!("pid {} stopped by {}, continuing it", job.pid(), signal);
                if let Err(e) = killpg(job.pgid(), Signal::SIGCONT) {
                    warn!("failed to continue pgid {}: {}", job.pgid(), e);
                }
            }
            Ok(other) => debug!("pid {} reported {:?}", job.pid(), other),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ProcessError::Wait(e)),
        }
    }
}
