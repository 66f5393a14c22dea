use crate::error::ShellError;
use std::path::PathBuf;

/// Expands a leading `~` or `~/` to the home directory. `~user` forms are
/// left as written.
#[derive(Clone, Default)]
pub struct PathExpander;

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn expand(&self, path: &str) -> Result<PathBuf, ShellError> {
        match path.strip_prefix('~') {
            Some("") => self.home_dir(),
            Some(rest) if rest.starts_with('/') => {
                let mut home = self.home_dir()?;
                home.extend(rest.split('/').filter(|part| !part.is_empty()));
                Ok(home)
            }
            _ => Ok(PathBuf::from(path)),
        }
    }

    fn home_dir(&self) -> Result<PathBuf, ShellError> {
        dirs::home_dir().ok_or(ShellError::HomeDirNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths_untouched() {
        let expander = PathExpander::new();
        assert_eq!(expander.expand("/tmp").expect("expand"), PathBuf::from("/tmp"));
        assert_eq!(expander.expand("src/~x").expect("expand"), PathBuf::from("src/~x"));
        assert_eq!(expander.expand("~bob/x").expect("expand"), PathBuf::from("~bob/x"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let expander = PathExpander::new();
        assert_eq!(expander.expand("~").expect("expand"), home);
        assert_eq!(expander.expand("~/a//b").expect("expand"), home.join("a").join("b"));
    }
}
