use std::os::fd::{BorrowedFd, RawFd};

use nix::unistd::{tcgetpgrp, tcsetpgrp, Pid};
use tracing::{debug, warn};

use super::ProcessError;

/// Ownership of the terminal's foreground process group.
pub trait TerminalControl {
    fn foreground_group(&self) -> Result<Pid, ProcessError>;
    fn set_foreground_group(&self, pgid: Pid) -> Result<(), ProcessError>;
}

/// The controlling terminal reached through a descriptor the shell keeps
/// open for its whole lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Tty {
    fd: RawFd,
}

impl Tty {
    pub fn new(fd: RawFd) -> Self {
        Tty { fd }
    }

    fn fd(&self) -> BorrowedFd<'_> {
        // SAFETY: the terminal descriptor is standard input, open until exit.
        unsafe { BorrowedFd::borrow_raw(self.fd) }
    }
}

impl TerminalControl for Tty {
    fn foreground_group(&self) -> Result<Pid, ProcessError> {
        tcgetpgrp(self.fd()).map_err(ProcessError::Terminal)
    }

    fn set_foreground_group(&self, pgid: Pid) -> Result<(), ProcessError> {
        tcsetpgrp(self.fd(), pgid).map_err(ProcessError::Terminal)
    }
}

/// Hands the terminal to a job and gives it back to the shell when dropped,
/// whether the wait in between finished, failed, or unwound.
pub struct ForegroundGuard<'a, T: TerminalControl + ?Sized> {
    terminal: &'a T,
    shell_pgid: Pid,
}

impl<'a, T: TerminalControl + ?Sized> ForegroundGuard<'a, T> {
    pub fn hand_over(terminal: &'a T, job_pgid: Pid, shell_pgid: Pid) -> Self {
        let guard = ForegroundGuard {
            terminal,
            shell_pgid,
        };
        match terminal.set_foreground_group(job_pgid) {
            Ok(()) => debug!("terminal handed to pgid {}", job_pgid),
            // The job may already be gone; the wait still has to happen.
            Err(e) => warn!("could not hand terminal to pgid {}: {}", job_pgid, e),
        }
        guard
    }
}

impl<T: TerminalControl + ?Sized> Drop for ForegroundGuard<'_, T> {
    fn drop(&mut self) {
        match self.terminal.set_foreground_group(self.shell_pgid) {
            Ok(()) => debug!("terminal reclaimed by pgid {}", self.shell_pgid),
            Err(e) => tracing::error!("failed to reclaim terminal: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Pid>>,
        refuse: Option<Pid>,
    }

    impl TerminalControl for Recorder {
        fn foreground_group(&self) -> Result<Pid, ProcessError> {
            self.calls
                .borrow()
                .last()
                .copied()
                .ok_or(ProcessError::Terminal(Errno::ENOTTY))
        }

        fn set_foreground_group(&self, pgid: Pid) -> Result<(), ProcessError> {
            if self.refuse == Some(pgid) {
                return Err(ProcessError::Terminal(Errno::EPERM));
            }
            self.calls.borrow_mut().push(pgid);
            Ok(())
        }
    }

    #[test]
    fn test_guard_reclaims_on_drop() {
        let terminal = Recorder::default();
        let shell = Pid::from_raw(100);
        let job = Pid::from_raw(200);
        {
            let _guard = ForegroundGuard::hand_over(&terminal, job, shell);
            assert_eq!(terminal.foreground_group().expect("group"), job);
        }
        assert_eq!(*terminal.calls.borrow(), [job, shell]);
    }

    #[test]
    fn test_guard_reclaims_when_hand_over_fails() {
        let job = Pid::from_raw(300);
        let terminal = Recorder {
            refuse: Some(job),
            ..Recorder::default()
        };
        let shell = Pid::from_raw(100);
        drop(ForegroundGuard::hand_over(&terminal, job, shell));
        assert_eq!(*terminal.calls.borrow(), [shell]);
    }

    #[test]
    fn test_guard_reclaims_on_unwind() {
        let terminal = Recorder::default();
        let shell = Pid::from_raw(100);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ForegroundGuard::hand_over(&terminal, Pid::from_raw(400), shell);
            panic!("wait interrupted");
        }));
        assert!(result.is_err());
        assert_eq!(terminal.calls.borrow().last(), Some(&shell));
    }
}
