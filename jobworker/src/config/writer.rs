//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let stack_size = config
        .launch
        .stack_size
        .map(|bytes| bytes.to_string())
        .unwrap_or_default();

    format!(
        r#"[launch]
; How long to wait for a launched job's thread to start, in milliseconds
startup_timeout_ms = {}
; What the launcher waits for before returning:
;   entered        - the job has entered setup (default)
;   setup_finished - the job's setup hook has returned
startup_policy = {}
; Background threads are named <prefix>-<job id>
thread_name_prefix = {}
; Background thread stack size in bytes (empty = platform default)
stack_size = {}

[logging]
; Directory for log files
directory = {}
; Log file name, cleared at the start of each session
file = {}
"#,
        config.launch.startup_timeout_ms,
        config.launch.startup_policy,
        config.launch.thread_name_prefix,
        stack_size,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Formats a path for the config file, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.contains("startup_timeout_ms = 1000"));
        assert!(content.contains("startup_policy = entered"));
        assert!(content.contains("thread_name_prefix = job"));
        assert!(content.contains("stack_size = \n"));
        assert!(content.contains("file = jobworker.log"));
    }

    #[test]
    fn test_path_to_string_abbreviates_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path_to_string(&home.join("logs")), "~/logs");
        }
        assert_eq!(path_to_string(Path::new("/opt/logs")), "/opt/logs");
    }
}
