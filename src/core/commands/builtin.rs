use std::io::{self, IsTerminal};

use super::{Builtin, CommandError, Status, BUILTINS};
use crate::highlight::SyntaxHighlighter;
use crate::process::JobControl;

#[derive(Clone)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Builtin for ExitCommand {
    fn execute(&self, _args: &[String], _jobs: &mut JobControl) -> Result<Status, CommandError> {
        Ok(Status::Exit(0))
    }
}

#[derive(Clone, Default)]
pub struct HelpCommand;

impl HelpCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, highlighter: &SyntaxHighlighter) -> String {
        BUILTINS
            .iter()
            .map(|(name, doc)| format!("{} - {}\n", name, highlighter.highlight_hint(doc)))
            .collect()
    }
}

impl Builtin for HelpCommand {
    fn execute(&self, _args: &[String], _jobs: &mut JobControl) -> Result<Status, CommandError> {
        // Checked per call: stdout may be redirected to a file right now.
        let highlighter = SyntaxHighlighter::for_stream(io::stdout().is_terminal());
        print!("{}", self.render(&highlighter));
        Ok(Status::Continue)
    }
}
