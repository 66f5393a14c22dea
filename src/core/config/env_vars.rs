use std::borrow::Cow;
use std::collections::BTreeMap;
use std::env;

use super::ConfigError;

/// Variables exported by the rc file. Each one is also written to the
/// process environment, which launched programs inherit.
#[derive(Debug, Default)]
pub struct EnvVarManager {
    exported: BTreeMap<Box<str>, Box<str>>,
}

impl EnvVarManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        if name.is_empty() || name.contains(['=', '\0']) {
            return Err(ConfigError::InvalidValue {
                name: name.to_string(),
                reason: "not a valid variable name",
            });
        }
        if value.contains('\0') {
            return Err(ConfigError::InvalidValue {
                name: name.to_string(),
                reason: "value contains a NUL byte",
            });
        }
        env::set_var(name, value);
        self.exported.insert(name.into(), value.into());
        Ok(())
    }

    /// Everything set so far, sorted by name.
    pub fn exported(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exported
            .iter()
            .map(|(name, value)| (name.as_ref(), value.as_ref()))
    }

    /// Substitute `$HOME` and `$PATH` with their current values. Empty `PATH`
    /// entries are kept as they are.
    pub fn expand_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let mut result = Cow::Borrowed(value);
        for name in ["HOME", "PATH"] {
            let var = format!("${name}");
            if result.contains(&var) {
                let current = env::var(name).unwrap_or_default();
                result = Cow::Owned(result.replace(&var, &current));
            }
        }
        result
    }
}
