//! Launch configuration.
//!
//! This module contains the [`LaunchConfig`] struct and related constants
//! for configuring how [`launch_with`](super::launch_with) starts a job.

use super::id::JobId;
use super::telemetry::{NullTelemetrySink, TelemetrySink};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Configuration Constants
// =============================================================================

/// Default time the launcher waits for the background thread to start.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(1);

/// Default prefix for background thread names (`{prefix}-{job_id}`).
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "job";

// =============================================================================
// Startup Policy
// =============================================================================

/// What the launcher waits for before handing back a [`Job`](super::Job).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartupPolicy {
    /// Return once the execution routine has entered `Setup`.
    #[default]
    Entered,

    /// Return once `on_setup` has returned (the job left `Setup`).
    SetupFinished,
}

impl fmt::Display for StartupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entered => write!(f, "entered"),
            Self::SetupFinished => write!(f, "setup_finished"),
        }
    }
}

impl FromStr for StartupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entered" => Ok(Self::Entered),
            "setup_finished" | "setup-finished" => Ok(Self::SetupFinished),
            other => Err(format!("unknown startup policy '{}'", other)),
        }
    }
}

// =============================================================================
// Launch Configuration
// =============================================================================

/// Configuration for launching a job.
#[derive(Clone)]
pub struct LaunchConfig {
    /// Explicit job ID. `None` generates `job-N`.
    pub job_id: Option<JobId>,

    /// How long the launcher waits for the startup condition.
    pub startup_timeout: Duration,

    /// The startup condition.
    pub startup_policy: StartupPolicy,

    /// Prefix for the background thread's name.
    pub thread_name_prefix: String,

    /// Stack size for the background thread. `None` uses the platform default.
    pub stack_size: Option<usize>,

    /// Receiver of lifecycle events.
    pub telemetry: Arc<dyn TelemetrySink>,
}

impl LaunchConfig {
    pub fn with_job_id(mut self, id: impl Into<JobId>) -> Self {
        self.job_id = Some(id.into());
        self
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn with_startup_policy(mut self, policy: StartupPolicy) -> Self {
        self.startup_policy = policy;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            job_id: None,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            startup_policy: StartupPolicy::default(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
            telemetry: Arc::new(NullTelemetrySink),
        }
    }
}

impl fmt::Debug for LaunchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchConfig")
            .field("job_id", &self.job_id)
            .field("startup_timeout", &self.startup_timeout)
            .field("startup_policy", &self.startup_policy)
            .field("thread_name_prefix", &self.thread_name_prefix)
            .field("stack_size", &self.stack_size)
            .finish_non_exhaustive()
    }
}

impl From<&crate::config::LaunchSettings> for LaunchConfig {
    fn from(settings: &crate::config::LaunchSettings) -> Self {
        Self {
            job_id: None,
            startup_timeout: Duration::from_millis(settings.startup_timeout_ms),
            startup_policy: settings.startup_policy,
            thread_name_prefix: settings.thread_name_prefix.clone(),
            stack_size: settings.stack_size,
            telemetry: Arc::new(NullTelemetrySink),
        }
    }
}
