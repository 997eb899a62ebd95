use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "$ ";
pub const STARTUP_FILE_NAME: &str = ".pipeshrc";
pub const STARTUP_FILE_VAR: &str = "PIPESH_RC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Shown when `PS1` is unset.
    pub default_prompt: String,
    /// `None` when neither `PIPESH_RC` nor `HOME` is set.
    pub startup_file: Option<PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            default_prompt: DEFAULT_PROMPT.to_string(),
            startup_file: None,
        }
    }

    pub fn from_env() -> Config {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let startup_file = lookup(STARTUP_FILE_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                lookup("HOME")
                    .filter(|home| !home.is_empty())
                    .map(|home| PathBuf::from(home).join(STARTUP_FILE_NAME))
            });
        Config {
            startup_file,
            ..Self::default_config()
        }
    }
}
