use super::{Builtin, CommandError, Status};
use crate::process::JobControl;
use tracing::debug;

/// Blocks until every background job has been reaped.
#[derive(Clone, Default)]
pub struct WaitCommand;

impl WaitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Builtin for WaitCommand {
    fn execute(&self, _args: &[String], jobs: &mut JobControl) -> Result<Status, CommandError> {
        let reaped = jobs.wait_background()?;
        debug!("wait reaped {} jobs", reaped);
        Ok(Status::Continue)
    }
}
