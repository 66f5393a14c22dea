use std::ffi::CString;
use std::io::Write;

use nix::errno::Errno;
use nix::unistd::{fork, getpid, setpgid, ForkResult};
use tracing::{debug, warn};

use super::command::Command;
use super::job::{Job, JobMode};
use super::resolver::{self, SearchPath};
use super::signal::{apply_signal_policy, SignalPolicy};
use super::terminal::TerminalControl;
use super::ProcessError;

/// Which side of the fork the caller is running on.
#[derive(Debug)]
pub enum Fork {
    Child,
    Parent(Job),
}

/// Create one new process that leads its own process group.
pub fn fork_job(mode: JobMode) -> Result<Fork, ProcessError> {
    // Buffered output would otherwise be written twice.
    if let Err(e) = std::io::stdout().flush() {
        warn!("failed to flush stdout before fork: {}", e);
    }

    // SAFETY: the shell is single-threaded and the child only calls
    // async-signal-safe setup before exec or exit.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            // Same call as in the child; whichever runs first wins, so the
            // group exists before the terminal is handed to it.
            match setpgid(child, child) {
                Ok(()) | Err(Errno::EACCES) | Err(Errno::ESRCH) => {}
                Err(e) => warn!("setpgid for child {} failed: {}", child, e),
            }
            debug!("forked pid {} ({:?})", child, mode);
            Ok(Fork::Parent(Job::new(child, mode)))
        }
        Ok(ForkResult::Child) => Ok(Fork::Child),
        Err(e) => Err(ProcessError::Fork(e)),
    }
}

/// Child side of a launch: own process group, the terminal when running in
/// the foreground, default signals, redirection, then program replacement.
/// Never returns; any failure ends the child with a non-zero status.
pub fn exec_child<T: TerminalControl + ?Sized>(
    command: &Command,
    argv: &[CString],
    path: &SearchPath,
    terminal: Option<&T>,
) -> ! {
    let err = prepare_and_exec(command, argv, path, terminal);
    eprintln!("husk: {}", err);
    // SAFETY: `_exit` skips the atexit handlers and stdio buffers inherited
    // from the shell, which belong to the parent.
    unsafe { libc::_exit(err.exit_code()) }
}

fn prepare_and_exec<T: TerminalControl + ?Sized>(
    command: &Command,
    argv: &[CString],
    path: &SearchPath,
    terminal: Option<&T>,
) -> ProcessError {
    let pid = getpid();
    if let Err(e) = setpgid(pid, pid) {
        return ProcessError::ProcessGroup(e);
    }
    // Same hand-over as the parent's, so the job never reads the terminal
    // from the background. SIGTTOU is still ignored at this point.
    if let Some(terminal) = terminal {
        if let Err(e) = terminal.set_foreground_group(pid) {
            debug!("child {} could not take the terminal: {}", pid, e);
        }
    }
    if let Err(e) = apply_signal_policy(SignalPolicy::ChildDefault) {
        return e;
    }
    if let Err(e) = command.redirection().apply() {
        return e;
    }
    resolver::exec(command.name(), argv, path)
}
