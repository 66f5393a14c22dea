use std::path::{Path, PathBuf};

const RC_FILE: &str = ".huskrc";
const HISTORY_FILE: &str = ".husk_history";

#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub rc_path: Option<PathBuf>,
    pub history_path: Option<PathBuf>,
}

impl ConfigPaths {
    /// Files under the home directory, with the rc file optionally replaced.
    pub fn new(rc_override: Option<PathBuf>) -> Self {
        let mut paths = dirs::home_dir()
            .map(|home| Self::in_home(&home))
            .unwrap_or_default();
        if rc_override.is_some() {
            paths.rc_path = rc_override;
        }
        paths
    }

    pub fn in_home(home: &Path) -> Self {
        ConfigPaths {
            rc_path: Some(home.join(RC_FILE)),
            history_path: Some(home.join(HISTORY_FILE)),
        }
    }
}
