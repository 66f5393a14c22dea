use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use tracing::debug;

use super::ProcessError;

/// Signals the shell ignores while it owns the terminal and a launched child
/// gets back at their defaults. SIGKILL and SIGSTOP cannot be caught or
/// ignored by anyone, so they are not listed.
pub const JOB_CONTROL_SIGNALS: [Signal; 7] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTERM,
    Signal::SIGTSTP,
    Signal::SIGCONT,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPolicy {
    /// Ignore terminal-generated signals; applied at the top of every dispatch.
    Shell,
    /// Default dispositions; applied in the child right after fork.
    ChildDefault,
}

impl SignalPolicy {
    fn handler(self) -> SigHandler {
        match self {
            SignalPolicy::Shell => SigHandler::SigIgn,
            SignalPolicy::ChildDefault => SigHandler::SigDfl,
        }
    }
}

pub fn apply_signal_policy(policy: SignalPolicy) -> Result<(), ProcessError> {
    debug!("apply signal policy {:?}", policy);
    let action = SigAction::new(policy.handler(), SaFlags::empty(), SigSet::empty());
    for signal in JOB_CONTROL_SIGNALS {
        // SAFETY: only SIG_IGN and SIG_DFL are installed, no handler code runs.
        unsafe { sigaction(signal, &action) }
            .map_err(|source| ProcessError::Signal { signal, source })?;
    }
    Ok(())
}
