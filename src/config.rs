use std::path::{Path, PathBuf};

use crate::error::{GitCtxError, Result};

/// File and directory names used by gitctx
pub mod paths {
    /// State directory (relative to HOME)
    pub const DIR_NAME: &str = ".gitctx";

    /// JSON registry file name
    pub const REGISTRY_FILE: &str = "config";

    /// Git config fragment file name
    pub const FRAGMENT_FILE: &str = "context";

    /// Global git config file (relative to HOME)
    pub const GLOBAL_GITCONFIG: &str = ".gitconfig";
}

/// Git config section and key names
pub mod git {
    /// Section holding the identity
    pub const USER_SECTION: &str = "user";

    /// Section holding include directives
    pub const INCLUDE_SECTION: &str = "include";

    /// Key under [include] naming an included file
    pub const INCLUDE_PATH_KEY: &str = "path";

    /// Identity name key
    pub const NAME_KEY: &str = "name";

    /// Identity email key
    pub const EMAIL_KEY: &str = "email";
}

/// Default values
pub mod defaults {
    /// Context that always exists and cannot be deleted
    pub const CONTEXT: &str = "default";

    /// Default log level
    pub const LOG_LEVEL: &str = "warn";
}

/// Process exit codes
pub mod exit_codes {
    pub const FAILURE: u8 = 1;
    pub const ALREADY_EXISTS: u8 = 3;
    pub const NOT_FOUND: u8 = 4;
    pub const PROTECTED_CONTEXT: u8 = 5;
}

/// Resolved file locations for one gitctx invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Home directory the other paths are derived from
    pub home_dir: PathBuf,
    /// ~/.gitctx
    pub state_dir: PathBuf,
    /// ~/.gitctx/config
    pub registry_path: PathBuf,
    /// ~/.gitctx/context
    pub fragment_path: PathBuf,
    /// ~/.gitconfig
    pub global_config_path: PathBuf,
}

impl Settings {
    /// Resolve settings from the current user's home directory
    pub fn from_home() -> Result<Self> {
        let home = dirs::home_dir().ok_or(GitCtxError::HomeNotFound)?;
        Ok(Self::with_home(home))
    }

    /// Build settings rooted at an explicit home directory
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home_dir = absolutize(home.into());
        let state_dir = home_dir.join(paths::DIR_NAME);
        Self {
            registry_path: state_dir.join(paths::REGISTRY_FILE),
            fragment_path: state_dir.join(paths::FRAGMENT_FILE),
            global_config_path: home_dir.join(paths::GLOBAL_GITCONFIG),
            state_dir,
            home_dir,
        }
    }

    /// Expand a leading `~/` the way git does for include paths
    pub fn expand_tilde(&self, value: &str) -> PathBuf {
        match value.strip_prefix("~/") {
            Some(rest) => self.home_dir.join(rest),
            None => PathBuf::from(value),
        }
    }
}

// The fragment is referenced from ~/.gitconfig by absolute path, so a relative
// home must be anchored before any path is derived from it.
fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

/// True when two paths name the same location, ignoring a trailing separator
pub fn same_path(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}
