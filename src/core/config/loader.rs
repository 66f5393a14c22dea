use std::{fs, io, path::Path};

use tracing::{debug, warn};

use super::{ConfigError, EnvVarManager};

pub struct ConfigLoader<'a> {
    path: &'a Path,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    pub fn load_into(&self, env_vars: &mut EnvVarManager) -> Result<(), ConfigError> {
        let content = match fs::read_to_string(self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no rc file at {}", self.path.display());
                return Ok(());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.to_path_buf(),
                    source,
                })
            }
        };

        for (number, line) in content.lines().enumerate() {
            if let Err(e) = self.process_line(line, env_vars) {
                warn!("{}:{}: {}", self.path.display(), number + 1, e);
            }
        }
        debug!("loaded {}", self.path.display());
        Ok(())
    }

    fn process_line(&self, line: &str, env_vars: &mut EnvVarManager) -> Result<(), ConfigError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        match line {
            s if s.starts_with("export ") => self.process_env_var(&s["export ".len()..], env_vars),
            s if s.starts_with("PATH=") => self.process_env_var(s, env_vars),
            _ => {
                debug!("ignoring rc line: {}", line);
                Ok(())
            }
        }
    }

    fn process_env_var(&self, var_def: &str, env_vars: &mut EnvVarManager) -> Result<(), ConfigError> {
        let Some((name, value)) = var_def.split_once('=') else {
            return Err(ConfigError::InvalidValue {
                name: var_def.trim().to_string(),
                reason: "expected NAME=value",
            });
        };
        let name = name.trim();
        let mut value = value.trim();

        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }

        let expanded_value = env_vars.expand_value(value);
        env_vars.set(name, &expanded_value)
    }
}
