use std::env;
use std::ffi::{CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::unistd::execv;
use tracing::debug;

use super::ProcessError;

/// Directories searched for bare command names, in `PATH` order.
///
/// An empty `PATH` entry stands for the current directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn from_env() -> Self {
        env::var_os("PATH")
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn parse(value: &OsStr) -> Self {
        let dirs = env::split_paths(value)
            .map(|dir| {
                if dir.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    dir
                }
            })
            .collect();
        SearchPath { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Paths to try for `name`, lazily. A name containing `/` is its own
    /// single candidate.
    pub fn candidates<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        if name.contains('/') {
            Box::new(std::iter::once(PathBuf::from(name)))
        } else {
            Box::new(self.dirs.iter().map(move |dir| dir.join(name)))
        }
    }
}

/// Replace the current process image with `name`, trying each candidate in
/// turn. Only returns on failure, carrying the error of the last attempt.
pub fn exec(name: &str, argv: &[CString], path: &SearchPath) -> ProcessError {
    let mut last = Errno::ENOENT;
    for candidate in path.candidates(name) {
        debug!("exec candidate {}", candidate.display());
        let program = match to_cstring(&candidate) {
            Ok(program) => program,
            Err(err) => return err,
        };
        match execv(&program, argv) {
            Ok(never) => match never {},
            Err(errno) => last = errno,
        }
    }
    ProcessError::NotFound {
        name: name.to_string(),
        source: last,
    }
}

fn to_cstring(path: &Path) -> Result<CString, ProcessError> {
    Ok(CString::new(path.as_os_str().as_bytes())?)
}
