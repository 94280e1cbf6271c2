//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [launch] section
    if let Some(section) = ini.section(Some("launch")) {
        if let Some(v) = section.get("startup_timeout_ms") {
            config.launch.startup_timeout_ms = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    invalid(
                        "launch",
                        "startup_timeout_ms",
                        v,
                        "must be a positive number of milliseconds",
                    )
                })?;
        }
        if let Some(v) = section.get("startup_policy") {
            config.launch.startup_policy = v.parse().map_err(|_| {
                invalid(
                    "launch",
                    "startup_policy",
                    v,
                    "must be 'entered' or 'setup_finished'",
                )
            })?;
        }
        if let Some(v) = section.get("thread_name_prefix") {
            let v = v.trim();
            if v.is_empty() || v.contains(char::is_whitespace) {
                return Err(invalid(
                    "launch",
                    "thread_name_prefix",
                    v,
                    "must be a non-empty name without spaces",
                ));
            }
            config.launch.thread_name_prefix = v.to_string();
        }
        if let Some(v) = section.get("stack_size") {
            let v = v.trim();
            config.launch.stack_size = if v.is_empty() {
                None
            } else {
                let bytes = v.parse::<usize>().ok().filter(|bytes| *bytes > 0);
                Some(bytes.ok_or_else(|| {
                    invalid(
                        "launch",
                        "stack_size",
                        v,
                        "must be a positive number of bytes, or empty",
                    )
                })?)
            };
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::StartupPolicy;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        assert_eq!(load("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_launch_section_overrides() {
        let config = load(
            r#"
[launch]
startup_timeout_ms = 250
startup_policy = setup_finished
thread_name_prefix = counter
stack_size = 65536
"#,
        )
        .unwrap();

        assert_eq!(config.launch.startup_timeout_ms, 250);
        assert_eq!(config.launch.startup_policy, StartupPolicy::SetupFinished);
        assert_eq!(config.launch.thread_name_prefix, "counter");
        assert_eq!(config.launch.stack_size, Some(65536));
    }

    #[test]
    fn test_empty_stack_size_means_platform_default() {
        let config = load("[launch]\nstack_size =\n").unwrap();
        assert!(config.launch.stack_size.is_none());
    }

    #[test]
    fn test_invalid_startup_timeout() {
        let err = load("[launch]\nstartup_timeout_ms = soon\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "startup_timeout_ms"
        ));
        assert!(err.to_string().contains("launch.startup_timeout_ms"));
    }

    #[test]
    fn test_zero_startup_timeout_rejected() {
        assert!(load("[launch]\nstartup_timeout_ms = 0\n").is_err());
    }

    #[test]
    fn test_invalid_startup_policy() {
        let err = load("[launch]\nstartup_policy = eventually\n").unwrap_err();
        assert!(err.to_string().contains("setup_finished"));
    }

    #[test]
    fn test_invalid_thread_name_prefix() {
        assert!(load("[launch]\nthread_name_prefix = two words\n").is_err());
    }

    #[test]
    fn test_invalid_stack_size() {
        assert!(load("[launch]\nstack_size = big\n").is_err());
        assert!(load("[launch]\nstack_size = 0\n").is_err());
    }

    #[test]
    fn test_logging_section_overrides() {
        let config = load(
            r#"
[logging]
directory = /var/log/jobworker
file = worker.log
"#,
        )
        .unwrap();

        assert_eq!(config.logging.directory, PathBuf::from("/var/log/jobworker"));
        assert_eq!(config.logging.file, "worker.log");
    }

    #[test]
    fn test_expand_tilde() {
        let plain = expand_tilde("/tmp/logs");
        assert_eq!(plain, PathBuf::from("/tmp/logs"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs"), home.join("logs"));
        }
    }
}
