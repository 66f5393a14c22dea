use std::io::{self, IsTerminal};
use std::os::fd::{BorrowedFd, RawFd};

use libc::STDIN_FILENO;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::termios::{tcgetattr, tcsetattr, SetArg, Termios};
use nix::unistd::{getpgrp, getpid, setpgid, tcgetpgrp, tcsetpgrp, Pid};
use tracing::debug;

use crate::process::{apply_signal_policy, ProcessError, SignalPolicy};

/// Process-wide job-control state, built once at startup and torn down with
/// [`ShellState::restore`] before exit.
#[derive(Debug)]
pub struct ShellState {
    is_interactive: bool,
    terminal_fd: RawFd,
    shell_pgid: Pid,
    saved_terminal_mode: Option<Termios>,
    background_count: usize,
}

impl ShellState {
    pub fn new(is_interactive: bool, terminal_fd: RawFd, shell_pgid: Pid) -> Self {
        ShellState {
            is_interactive,
            terminal_fd,
            shell_pgid,
            saved_terminal_mode: None,
            background_count: 0,
        }
    }

    /// Startup sequence. When standard input is a terminal, waits until the
    /// shell is in the foreground, moves it into its own process group, takes
    /// the terminal, and snapshots the terminal mode.
    pub fn init() -> Result<Self, ProcessError> {
        if !io::stdin().is_terminal() {
            debug!("standard input is not a terminal, job control disabled");
            return Ok(ShellState::new(false, STDIN_FILENO, getpgrp()));
        }

        let mut state = ShellState::new(true, STDIN_FILENO, getpid());
        let terminal = state.terminal();

        // Started in the background: stop until someone brings us forward.
        loop {
            let pgid = getpgrp();
            if tcgetpgrp(terminal).map_err(ProcessError::Terminal)? == pgid {
                break;
            }
            killpg(pgid, Signal::SIGTTIN).map_err(ProcessError::Terminal)?;
        }

        // Moving groups makes us a background group for a moment; claiming
        // the terminal from there must not stop us with SIGTTOU.
        apply_signal_policy(SignalPolicy::Shell)?;
        match setpgid(state.shell_pgid, state.shell_pgid) {
            // A session leader already leads its group and may not move.
            Ok(()) | Err(Errno::EPERM) => {}
            Err(e) => return Err(ProcessError::ProcessGroup(e)),
        }
        state.shell_pgid = getpgrp();
        tcsetpgrp(terminal, state.shell_pgid).map_err(ProcessError::Terminal)?;
        state.saved_terminal_mode = Some(tcgetattr(terminal).map_err(ProcessError::Terminal)?);
        debug!("shell pgid {} owns the terminal", state.shell_pgid);

        Ok(state)
    }

    /// Put the terminal back in the mode captured at startup.
    pub fn restore(&self) -> Result<(), ProcessError> {
        if let Some(mode) = &self.saved_terminal_mode {
            tcsetattr(self.terminal(), SetArg::TCSADRAIN, mode).map_err(ProcessError::Terminal)?;
        }
        Ok(())
    }

    pub fn is_interactive(&self) -> bool {
        self.is_interactive
    }

    pub fn terminal_fd(&self) -> RawFd {
        self.terminal_fd
    }

    pub fn shell_pgid(&self) -> Pid {
        self.shell_pgid
    }

    pub fn background_count(&self) -> usize {
        self.background_count
    }

    pub(crate) fn record_background(&mut self) {
        self.background_count += 1;
    }

    pub(crate) fn record_reaped(&mut self) {
        self.background_count = self.background_count.saturating_sub(1);
    }

    pub(crate) fn forget_background(&mut self) {
        self.background_count = 0;
    }

    fn terminal(&self) -> BorrowedFd<'static> {
        // SAFETY: the terminal descriptor is standard input, open until exit.
        unsafe { BorrowedFd::borrow_raw(self.terminal_fd) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_background_jobs() {
        let mut state = ShellState::new(false, STDIN_FILENO, getpgrp());
        state.record_background();
        state.record_background();
        assert_eq!(state.background_count(), 2);
        state.record_reaped();
        assert_eq!(state.background_count(), 1);
        state.forget_background();
        assert_eq!(state.background_count(), 0);
        state.record_reaped();
        assert_eq!(state.background_count(), 0);
    }

    #[test]
    fn test_restore_without_snapshot_is_noop() {
        let state = ShellState::new(false, STDIN_FILENO, getpgrp());
        assert!(state.restore().is_ok());
        assert!(!state.is_interactive());
    }
}
