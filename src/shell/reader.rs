use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::error::ShellError;

pub(crate) enum Line {
    Input(String),
    /// Ctrl-C at the prompt; the partial line is dropped.
    Interrupted,
    /// The editor could not decode what was typed; the line is dropped.
    Undecodable,
    Eof,
}

/// Where command lines come from: a line editor on a terminal, or plain
/// standard input (no prompt) otherwise.
pub(crate) enum LineReader {
    Editor {
        editor: Box<DefaultEditor>,
        history: Option<PathBuf>,
    },
    Piped,
}

impl LineReader {
    pub(crate) fn new(interactive: bool, history: Option<&Path>) -> Result<Self, ShellError> {
        if !interactive {
            return Ok(LineReader::Piped);
        }

        let mut editor = DefaultEditor::new()?;
        if let Some(path) = history {
            if let Err(e) = editor.load_history(path) {
                debug!("no history loaded from {}: {}", path.display(), e);
            }
        }
        Ok(LineReader::Editor {
            editor: Box::new(editor),
            history: history.map(Path::to_path_buf),
        })
    }

    pub(crate) fn read_line(&mut self, prompt: &str) -> Result<Line, ShellError> {
        match self {
            LineReader::Editor { editor, .. } => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = editor.add_history_entry(line.as_str()) {
                            warn!("couldn't add to history: {}", e);
                        }
                    }
                    Ok(Line::Input(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Line::Interrupted),
                Err(ReadlineError::Eof) => Ok(Line::Eof),
                Err(ReadlineError::Io(ref e)) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!("input is not valid UTF-8, line dropped");
                    Ok(Line::Undecodable)
                }
                Err(e) => Err(e.into()),
            },
            LineReader::Piped => {
                let mut bytes = Vec::new();
                match io::stdin().lock().read_until(b'\n', &mut bytes)? {
                    0 => Ok(Line::Eof),
                    _ => Ok(Line::Input(decode(bytes))),
                }
            }
        }
    }

    pub(crate) fn save_history(&mut self) {
        if let LineReader::Editor {
            editor,
            history: Some(path),
        } = self
        {
            if let Err(e) = editor.save_history(path) {
                warn!("couldn't save history to {}: {}", path.display(), e);
            }
        }
    }
}

/// Lines are text to the tokenizer; bytes that are not UTF-8 become U+FFFD
/// instead of ending the read loop.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => {
            debug!("replacing invalid UTF-8 in input line");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}
