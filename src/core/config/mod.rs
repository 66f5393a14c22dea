use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

mod env_vars;
mod loader;
mod paths;

use env_vars::EnvVarManager;
use loader::ConfigLoader;
use paths::ConfigPaths;

/// Startup configuration read from the rc file.
pub struct Config {
    paths: ConfigPaths,
    env_vars: EnvVarManager,
}

impl Config {
    pub fn new(rc_override: Option<PathBuf>) -> Self {
        Config {
            paths: ConfigPaths::new(rc_override),
            env_vars: EnvVarManager::new(),
        }
    }

    pub fn load(&mut self) -> Result<(), ConfigError> {
        let Some(rc_path) = self.paths.rc_path.clone() else {
            debug!("no home directory, skipping rc file");
            return Ok(());
        };
        ConfigLoader::new(&rc_path).load_into(&mut self.env_vars)?;
        for (name, value) in self.env_vars.exported() {
            debug!("exported {}={}", name, value);
        }
        Ok(())
    }

    pub fn history_path(&self) -> Option<&Path> {
        self.paths.history_path.as_deref()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: &'static str },
}
