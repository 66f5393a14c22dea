use nix::sys::signal::Signal;
use nix::unistd::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMode {
    Foreground,
    Background,
}

/// One launched process. Every job leads its own process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pid: Pid,
    pgid: Pid,
    mode: JobMode,
}

impl Job {
    pub(crate) fn new(pid: Pid, mode: JobMode) -> Self {
        Job {
            pid,
            pgid: pid,
            mode,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn pgid(&self) -> Pid {
        self.pgid
    }

    pub fn mode(&self) -> JobMode {
        self.mode
    }
}

/// How a foreground job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Exited(i32),
    Signaled(Signal),
}

impl JobStatus {
    pub fn success(&self) -> bool {
        matches!(self, JobStatus::Exited(0))
    }

    /// Status as a shell reports it: the exit code, or 128 plus the signal number.
    pub fn code(&self) -> i32 {
        match self {
            JobStatus::Exited(code) => *code,
            JobStatus::Signaled(signal) => 128 + *signal as i32,
        }
    }
}
