//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use jobworker::config::ConfigFileError;
use jobworker::worker::LaunchError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Failed to read or write the config file
    ConfigFile(ConfigFileError),
    /// Failed to launch the job
    Launch(LaunchError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the config file, or regenerate it with:");
                eprintln!("  jobworker config init --force");
            }
            CliError::Launch(LaunchError::StartupTimeout { .. }) => {
                eprintln!();
                eprintln!("The job thread did not start in time. Try raising");
                eprintln!("startup_timeout_ms in the [launch] section of the config file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Launch(e) => write!(f, "Failed to launch job: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Launch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LaunchError> for CliError {
    fn from(e: LaunchError) -> Self {
        CliError::Launch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::time::Duration;

    #[test]
    fn test_display_and_source() {
        let logging = CliError::LoggingInit("permission denied".to_string());
        assert_eq!(
            logging.to_string(),
            "Failed to initialize logging: permission denied"
        );
        assert!(logging.source().is_none());

        let launch = CliError::from(LaunchError::StartupTimeout {
            timeout: Duration::from_secs(1),
        });
        assert!(launch.to_string().starts_with("Failed to launch job: "));
        assert!(launch.source().is_some());

        let config = CliError::from(ConfigFileError::InvalidValue {
            section: "launch".to_string(),
            key: "startup_timeout_ms".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
        assert!(config.source().is_some());
    }
}
