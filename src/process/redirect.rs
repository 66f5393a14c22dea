use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::{dup, dup2};
use tracing::{debug, error};

use super::command::Redirection;
use super::ProcessError;

impl Redirection {
    /// Open the redirection target, returning it together with the standard
    /// descriptor it is meant to replace.
    pub fn open(&self) -> Result<Option<(File, RawFd)>, ProcessError> {
        let (path, opened, fd) = match self {
            Redirection::None => return Ok(None),
            Redirection::Out(path) => (
                path,
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path),
                STDOUT_FILENO,
            ),
            Redirection::In(path) => (path, File::open(path), STDIN_FILENO),
        };
        let file = opened.map_err(|source| ProcessError::Redirect {
            path: path.clone(),
            source,
        })?;
        Ok(Some((file, fd)))
    }

    /// Rewire this process's standard input or output. Only ever called in a
    /// freshly forked child, so the shell's own descriptors stay untouched.
    pub fn apply(&self) -> Result<(), ProcessError> {
        if let Some((file, fd)) = self.open()? {
            debug!("redirect fd {} -> {:?}", fd, self.target());
            dup2(file.as_raw_fd(), fd).map_err(|source| ProcessError::Descriptor { fd, source })?;
            // `file` closes here; `fd` keeps the open file description alive.
        }
        Ok(())
    }

    /// Rewire standard input or output of the shell itself until the
    /// returned guard is dropped. Used around builtins, which run in-process.
    pub fn scoped(&self) -> Result<ScopedRedirect, ProcessError> {
        let Some((file, fd)) = self.open()? else {
            return Ok(ScopedRedirect { saved: None });
        };
        flush_stdout(fd);
        let raw = dup(fd).map_err(|source| ProcessError::Descriptor { fd, source })?;
        // SAFETY: `raw` was just returned by dup and nothing else owns it.
        let saved = unsafe { OwnedFd::from_raw_fd(raw) };
        dup2(file.as_raw_fd(), fd).map_err(|source| ProcessError::Descriptor { fd, source })?;
        debug!("scoped redirect fd {} -> {:?}", fd, self.target());
        Ok(ScopedRedirect {
            saved: Some((saved, fd)),
        })
    }
}

/// Puts the shell's own descriptor back when dropped.
#[derive(Debug)]
pub struct ScopedRedirect {
    saved: Option<(OwnedFd, RawFd)>,
}

impl Drop for ScopedRedirect {
    fn drop(&mut self) {
        if let Some((saved, fd)) = &self.saved {
            flush_stdout(*fd);
            match dup2(saved.as_raw_fd(), *fd) {
                Ok(_) => debug!("fd {} restored", fd),
                Err(e) => error!("failed to restore fd {}: {}", fd, e),
            }
        }
    }
}

fn flush_stdout(fd: RawFd) {
    if fd == STDOUT_FILENO {
        if let Err(e) = io::stdout().flush() {
            debug!("flush before redirect failed: {}", e);
        }
    }
}
