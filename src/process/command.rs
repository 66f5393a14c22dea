use std::ffi::CString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ProcessError;

const BACKGROUND: &str = "&";
const REDIRECT_OUT: &str = ">";
const REDIRECT_IN: &str = "<";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    EmptyCommand,
    #[error("missing file name after `{0}`")]
    MissingRedirectTarget(&'static str),
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
}

/// Replacement of standard input or output for a single command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Redirection {
    #[default]
    None,
    Out(PathBuf),
    In(PathBuf),
}

impl Redirection {
    pub fn target(&self) -> Option<&Path> {
        match self {
            Redirection::None => None,
            Redirection::Out(path) | Redirection::In(path) => Some(path),
        }
    }
}

/// A command line with its trailing `&` and `> file` / `< file` pulled out.
///
/// Only the end of the token sequence is inspected: `&` must be the final
/// token, and a redirection operator must be the second-to-last token of
/// what remains after `&` is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    argv: Vec<String>,
    redirection: Redirection,
    background: bool,
}

impl Command {
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ParseError> {
        let mut words: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();

        let background = words.last() == Some(&BACKGROUND);
        if background {
            words.pop();
        }

        let redirection = match words.as_slice() {
            [.., op, target] if *op == REDIRECT_OUT => Redirection::Out(PathBuf::from(*target)),
            [.., op, target] if *op == REDIRECT_IN => Redirection::In(PathBuf::from(*target)),
            [.., last] if *last == REDIRECT_OUT => {
                return Err(ParseError::MissingRedirectTarget(REDIRECT_OUT))
            }
            [.., last] if *last == REDIRECT_IN => {
                return Err(ParseError::MissingRedirectTarget(REDIRECT_IN))
            }
            _ => Redirection::None,
        };
        if redirection.target().is_some() {
            words.truncate(words.len() - 2);
        }

        if words.is_empty() {
            return Err(ParseError::EmptyCommand);
        }

        Ok(Command {
            argv: words.into_iter().map(String::from).collect(),
            redirection,
            background,
        })
    }

    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn redirection(&self) -> &Redirection {
        &self.redirection
    }

    pub fn background(&self) -> bool {
        self.background
    }

    /// Argument vector in the form `execv` takes.
    pub fn c_argv(&self) -> Result<Vec<CString>, ProcessError> {
        self.argv
            .iter()
            .map(|arg| CString::new(arg.as_str()).map_err(ProcessError::from))
            .collect()
    }
}
