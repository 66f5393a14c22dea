use std::cell::RefCell;
use std::error::Error;
use std::io;
use std::os::fd::AsRawFd;
use std::sync::{Mutex, MutexGuard};

use husk::core::state::ShellState;
use husk::process::{
    apply_signal_policy, Command, JobControl, JobMode, JobStatus, LaunchOutcome, ProcessError,
    SignalPolicy, TerminalControl,
};
use nix::errno::Errno;
use nix::pty::openpty;
use nix::sys::signal::{raise, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, fork, getpgid, getpgrp, setsid, tcgetpgrp, ForkResult, Pid};

// `wait` collects any child of this process, so forking tests take turns.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Records every foreground-group change instead of touching a real terminal.
#[derive(Default)]
struct RecordingTerminal {
    groups: RefCell<Vec<Pid>>,
}

impl TerminalControl for RecordingTerminal {
    fn foreground_group(&self) -> Result<Pid, ProcessError> {
        self.groups
            .borrow()
            .last()
            .copied()
            .ok_or(ProcessError::Terminal(Errno::ENOTTY))
    }

    fn set_foreground_group(&self, pgid: Pid) -> Result<(), ProcessError> {
        self.groups.borrow_mut().push(pgid);
        Ok(())
    }
}

fn interactive_jobs() -> JobControl<RecordingTerminal> {
    let state = ShellState::new(true, libc::STDIN_FILENO, getpgrp());
    JobControl::with_terminal(state, RecordingTerminal::default())
}

fn command(tokens: &[&str]) -> Command {
    Command::parse(tokens).expect("valid command")
}

#[test]
fn foreground_job_returns_terminal_to_shell() {
    let _lock = serial();
    let mut jobs = interactive_jobs();
    let shell_pgid = jobs.state().shell_pgid();

    let outcome = jobs.launch(&command(&["/bin/true"])).expect("launch");

    assert_eq!(outcome, LaunchOutcome::Completed(JobStatus::Exited(0)));
    let groups = jobs.terminal().groups.borrow();
    assert_eq!(groups.len(), 2);
    assert_ne!(groups[0], shell_pgid, "terminal must go to the job's own group");
    assert_eq!(groups[1], shell_pgid);
    assert_eq!(jobs.terminal().foreground_group().expect("group"), shell_pgid);
}

#[test]
fn terminal_is_reclaimed_after_abnormal_exit() {
    let _lock = serial();
    let mut jobs = interactive_jobs();
    let shell_pgid = jobs.state().shell_pgid();

    let outcome = jobs
        .launch(&command(&["/bin/sh", "-c", "kill -KILL $$"]))
        .expect("launch");

    assert_eq!(outcome, LaunchOutcome::Completed(JobStatus::Signaled(Signal::SIGKILL)));
    assert_eq!(jobs.terminal().foreground_group().expect("group"), shell_pgid);
}

#[test]
fn failed_exec_exits_child_with_127() {
    let _lock = serial();
    let mut jobs = interactive_jobs();
    let shell_pgid = jobs.state().shell_pgid();

    let outcome = jobs
        .launch(&command(&["/nonexistent/husk-program"]))
        .expect("launch");

    assert_eq!(outcome, LaunchOutcome::Completed(JobStatus::Exited(127)));
    assert_eq!(jobs.terminal().foreground_group().expect("group"), shell_pgid);
}

#[test]
fn child_leads_its_own_process_group() {
    let _lock = serial();
    let mut jobs = interactive_jobs();

    let outcome = jobs
        .launch(&command(&["/bin/sh", "-c", "sleep 1", "&"]))
        .expect("launch");
    let LaunchOutcome::Detached(job) = outcome else {
        panic!("expected a background job, got {outcome:?}");
    };

    assert_eq!(job.mode(), JobMode::Background);
    assert_eq!(job.pgid(), job.pid());
    assert_eq!(getpgid(Some(job.pid())).expect("getpgid"), job.pid());
    assert_ne!(job.pgid(), jobs.state().shell_pgid());
    assert!(jobs.terminal().groups.borrow().is_empty());

    assert_eq!(jobs.wait_background().expect("wait"), 1);
}

#[test]
fn background_count_tracks_launches_and_wait() {
    let _lock = serial();
    let mut jobs = interactive_jobs();

    for _ in 0..3 {
        let outcome = jobs
            .launch(&command(&["/bin/sh", "-c", "exit 0", "&"]))
            .expect("launch");
        assert!(matches!(outcome, LaunchOutcome::Detached(_)));
    }
    assert_eq!(jobs.state().background_count(), 3);
    assert!(jobs.terminal().groups.borrow().is_empty());

    assert_eq!(jobs.wait_background().expect("wait"), 3);
    assert_eq!(jobs.state().background_count(), 0);
}

#[test]
fn non_interactive_shell_never_touches_terminal() {
    let _lock = serial();
    let state = ShellState::new(false, libc::STDIN_FILENO, getpgrp());
    let mut jobs = JobControl::with_terminal(state, RecordingTerminal::default());

    let outcome = jobs.launch(&command(&["/bin/sh", "-c", "exit 5"])).expect("launch");

    assert_eq!(outcome, LaunchOutcome::Completed(JobStatus::Exited(5)));
    assert!(jobs.terminal().groups.borrow().is_empty());
}

#[test]
fn stopped_foreground_job_is_continued() {
    let _lock = serial();
    let state = ShellState::new(false, libc::STDIN_FILENO, getpgrp());
    let mut jobs = JobControl::with_terminal(state, RecordingTerminal::default());

    let outcome = jobs
        .launch(&command(&["/bin/sh", "-c", "kill -STOP $$; exit 4"]))
        .expect("launch");

    assert_eq!(outcome, LaunchOutcome::Completed(JobStatus::Exited(4)));
}

/// Runs in a fresh session whose controlling terminal is a pseudo-terminal on
/// standard input. Returns whether the shell still owns it after a job ran.
fn shell_keeps_pty_after_job() -> Result<bool, Box<dyn Error>> {
    setsid()?;
    let pty = openpty(None, None)?;
    // SAFETY: TIOCSCTTY takes an integer argument and touches no memory.
    if unsafe { libc::ioctl(pty.slave.as_raw_fd(), libc::TIOCSCTTY as _, 0) } != 0 {
        return Err(io::Error::last_os_error().into());
    }
    dup2(pty.slave.as_raw_fd(), libc::STDIN_FILENO)?;

    let state = ShellState::init()?;
    let shell_pgid = state.shell_pgid();
    if !state.is_interactive() || tcgetpgrp(io::stdin())? != shell_pgid {
        return Ok(false);
    }

    let mut jobs = JobControl::new(state);
    let outcome = jobs.launch(&command(&["/bin/true"]))?;
    let owner = tcgetpgrp(io::stdin())?;
    jobs.shutdown()?;

    Ok(outcome == LaunchOutcome::Completed(JobStatus::Exited(0))
        && owner == shell_pgid
        && shell_pgid == getpgrp())
}

#[test]
fn real_terminal_returns_to_shell_after_foreground_job() {
    let _lock = serial();
    // SAFETY: other tests are parked on the lock; the child leaves via _exit.
    match unsafe { fork() }.expect("fork") {
        ForkResult::Child => {
            let code = match shell_keeps_pty_after_job() {
                Ok(true) => 0,
                Ok(false) => 1,
                Err(e) => {
                    eprintln!("pty setup failed: {e}");
                    2
                }
            };
            unsafe { libc::_exit(code) }
        }
        ForkResult::Parent { child } => {
            let status = waitpid(child, None).expect("waitpid");
            assert!(matches!(status, WaitStatus::Exited(_, 0)), "got {status:?}");
        }
    }
}

fn status_after_raise(policies: &[SignalPolicy]) -> WaitStatus {
    // SAFETY: the child only changes dispositions, raises, and leaves via _exit.
    match unsafe { fork() }.expect("fork") {
        ForkResult::Child => {
            for policy in policies {
                if apply_signal_policy(*policy).is_err() {
                    unsafe { libc::_exit(2) };
                }
            }
            let _ = raise(Signal::SIGTERM);
            unsafe { libc::_exit(0) }
        }
        ForkResult::Parent { child } => waitpid(child, None).expect("waitpid"),
    }
}

#[test]
fn shell_policy_ignores_terminal_signals() {
    let _lock = serial();
    let status = status_after_raise(&[SignalPolicy::Shell]);
    assert!(matches!(status, WaitStatus::Exited(_, 0)), "got {status:?}");
}

#[test]
fn child_policy_restores_defaults() {
    let _lock = serial();
    let status = status_after_raise(&[SignalPolicy::Shell, SignalPolicy::ChildDefault]);
    assert!(
        matches!(status, WaitStatus::Signaled(_, Signal::SIGTERM, _)),
        "got {status:?}"
    );
}
