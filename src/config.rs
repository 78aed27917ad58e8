//! Runtime configuration read from the environment

use std::path::PathBuf;

/// Deepest nesting of evaluations before a statement is aborted
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum evaluation depth (default 256, configurable via TRACKER_MAX_DEPTH)
    pub max_depth: usize,
    /// REPL history file (TRACKER_HISTORY, else ~/.tracker_history)
    pub history_file: Option<PathBuf>,
    /// Startup file (TRACKER_RC, else ~/.trackerrc)
    pub rc_file: Option<PathBuf>,
    /// Skip the startup file entirely (TRACKER_NO_RC=1)
    pub skip_rc: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            history_file: home_dir().map(|h| h.join(".tracker_history")),
            rc_file: home_dir().map(|h| h.join(".trackerrc")),
            skip_rc: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            max_depth: std::env::var("TRACKER_MAX_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|depth| *depth > 0)
                .unwrap_or(defaults.max_depth),
            history_file: std::env::var_os("TRACKER_HISTORY")
                .map(PathBuf::from)
                .or(defaults.history_file),
            rc_file: std::env::var_os("TRACKER_RC")
                .map(PathBuf::from)
                .or(defaults.rc_file),
            skip_rc: std::env::var("TRACKER_NO_RC").map_or(false, |v| v == "1"),
        }
    }
}

/// Get home directory
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
