use super::{Builtin, CommandError, Status};
use crate::path::PathExpander;
use crate::process::JobControl;
use std::env;

#[derive(Clone)]
pub struct CdCommand {
    path_expander: PathExpander,
}

impl Default for CdCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CdCommand {
    pub fn new() -> Self {
        Self {
            path_expander: PathExpander::new(),
        }
    }
}

impl Builtin for CdCommand {
    fn execute(&self, args: &[String], _jobs: &mut JobControl) -> Result<Status, CommandError> {
        if args.len() > 1 {
            return Err(CommandError::InvalidArguments("cd: too many arguments".to_string()));
        }
        let path_str = args.first().map(|s| s.as_str()).unwrap_or("~");
        let expanded_path = self
            .path_expander
            .expand(path_str)
            .map_err(|e| CommandError::ExecutionError(e.to_string()))?;

        env::set_current_dir(&expanded_path).map_err(|e| {
            CommandError::ExecutionError(format!("cd: {}: {}", expanded_path.display(), e))
        })?;
        Ok(Status::Continue)
    }
}
