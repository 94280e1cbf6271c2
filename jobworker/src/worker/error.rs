//! Error types for launching and running jobs.

use super::id::JobId;
use std::any::Any;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// An error raised from inside a runnable hook.
///
/// Returning `Err` from a hook and panicking inside one are treated the same
/// way: the phase counts as failed, teardown still runs, and the error is
/// surfaced through [`Job::wait`](super::Job::wait).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnableError {
    /// The hook returned an error.
    #[error("{0}")]
    Failed(String),

    /// The hook panicked.
    #[error("panicked: {0}")]
    Panicked(String),
}

impl RunnableError {
    /// Creates a `Failed` error from any displayable message.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Self::Failed(message.to_string())
    }

    /// Converts a panic payload captured by `catch_unwind`.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

impl From<io::Error> for RunnableError {
    fn from(e: io::Error) -> Self {
        Self::Failed(e.to_string())
    }
}

/// Errors surfaced to a caller that awaits a job's completion result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The job's control block had already left `NotStarted`.
    #[error("job {0} was already started")]
    AlreadyStarted(JobId),

    /// `on_setup` raised an error.
    #[error("setup raised an error: {0}")]
    Setup(#[source] RunnableError),

    /// `on_working` raised an error.
    #[error("working raised an error: {0}")]
    Working(#[source] RunnableError),

    /// `on_teardown` raised an error and no earlier phase had.
    #[error("teardown raised an error: {0}")]
    Teardown(#[source] RunnableError),

    /// The background thread ended without reporting a result.
    #[error("background thread for job {0} terminated abnormally")]
    Aborted(JobId),
}

/// Errors returned synchronously from [`launch`](super::launch).
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The input descriptor refused to produce a job.
    #[error("invalid job input: {0}")]
    InvalidInput(String),

    /// The background thread could not be created.
    #[error("failed to spawn job thread: {0}")]
    Spawn(#[from] io::Error),

    /// The background thread did not reach its startup condition in time.
    #[error("launched thread did not start within {timeout:?}")]
    StartupTimeout { timeout: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_runnable_error_from_str_panic() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(
            RunnableError::from_panic(payload),
            RunnableError::Panicked("boom".to_string())
        );
    }

    #[test]
    fn test_runnable_error_from_string_panic() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(
            RunnableError::from_panic(payload),
            RunnableError::Panicked("bang".to_string())
        );
    }

    #[test]
    fn test_runnable_error_from_opaque_panic() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert!(matches!(
            RunnableError::from_panic(payload),
            RunnableError::Panicked(_)
        ));
    }

    #[test]
    fn test_runnable_error_from_io() {
        let err: RunnableError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.to_string(), "missing");
    }

    #[test]
    fn test_job_error_source_is_runnable_error() {
        let err = JobError::Working(RunnableError::msg("disk full"));
        assert_eq!(err.to_string(), "working raised an error: disk full");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_launch_error_display() {
        let err = LaunchError::StartupTimeout {
            timeout: Duration::from_secs(1),
        };
        assert_eq!(err.to_string(), "launched thread did not start within 1s");

        let err = LaunchError::InvalidInput("end before start".to_string());
        assert_eq!(err.to_string(), "invalid job input: end before start");
    }
}
