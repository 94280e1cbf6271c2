//! Job identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifier for a launched job.
///
/// Used in thread names, log fields, and telemetry events. IDs are either
/// generated automatically or supplied by the caller through
/// [`LaunchConfig::with_job_id`](super::LaunchConfig::with_job_id).
///
/// # Example
///
/// ```
/// use jobworker::worker::JobId;
///
/// let id = JobId::auto();
/// assert!(id.as_str().starts_with("job-"));
///
/// let named = JobId::new("nightly-count");
/// assert_eq!(named.to_string(), "nightly-count");
/// ```
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct JobId(String);

impl JobId {
    /// Creates a job ID with the given string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a unique auto-generated job ID of the form `job-{counter}`.
    pub fn auto() -> Self {
        let counter = JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("job-{}", counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
