//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::worker::{StartupPolicy, DEFAULT_STARTUP_TIMEOUT, DEFAULT_THREAD_NAME_PREFIX};
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// How jobs are launched
    pub launch: LaunchSettings,
    /// Where logs are written
    pub logging: LoggingSettings,
}

/// Launch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    /// How long the launcher waits for the background thread, in milliseconds.
    pub startup_timeout_ms: u64,
    /// What the launcher waits for before returning.
    pub startup_policy: StartupPolicy,
    /// Prefix for background thread names.
    pub thread_name_prefix: String,
    /// Background thread stack size in bytes. `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            startup_timeout_ms: u64::try_from(DEFAULT_STARTUP_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            startup_policy: StartupPolicy::default(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log directory
    pub directory: PathBuf,
    /// Log file name within `directory`
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: crate::logging::default_log_dir(),
            file: crate::logging::default_log_file().to_string(),
        }
    }
}
