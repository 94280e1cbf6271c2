//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading and logging initialization so command
//! handlers start from the same state.

use crate::error::CliError;
use jobworker::config::ConfigFile;
use jobworker::logging::{init_logging, LoggingGuard};
use jobworker::worker::{LaunchConfig, TracingTelemetrySink};
use std::sync::Arc;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// When stdout is a TTY, stdout logging is disabled so log lines do not
    /// interleave with progress output.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging unless RUST_LOG overrides it
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(
            &config.logging.directory,
            &config.logging.file,
            stdout_enabled,
            debug_mode,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Launch configuration from the config file, reporting lifecycle events
    /// through the log.
    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig::from(&self.config.launch).with_telemetry(Arc::new(TracingTelemetrySink))
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("jobworker v{}", jobworker::VERSION);
        info!("jobworker CLI: {} command", command);
    }
}
