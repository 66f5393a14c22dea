use super::{Builtin, CommandError, Status};
use crate::process::JobControl;
use std::env;

#[derive(Clone, Default)]
pub struct PwdCommand;

impl PwdCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Builtin for PwdCommand {
    fn execute(&self, _args: &[String], _jobs: &mut JobControl) -> Result<Status, CommandError> {
        let cwd = env::current_dir()?;
        println!("{}", cwd.display());
        Ok(Status::Continue)
    }
}
