//! Launching jobs onto background threads.
//!
//! [`launch`] takes an input descriptor, asks it for a runnable and an output
//! record, spawns the execution routine on a dedicated thread, and waits until
//! that thread has actually started before returning a [`Job`].
//!
//! Note that a [`Job`] aborts and waits when dropped, so discarding the result
//! makes the launch effectively synchronous:
//!
//! ```ignore
//! launch(&input)?;            // aborts immediately and blocks until torn down
//!
//! let job = launch(&input)?;  // keep the handle while the job runs
//! ```

use super::config::{LaunchConfig, StartupPolicy};
use super::control::JobControl;
use super::error::LaunchError;
use super::execute::run_job;
use super::id::JobId;
use super::job::Job;
use super::runnable::Runnable;
use super::state::State;
use super::telemetry::{duration_ms, TelemetryEvent};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// Everything an input descriptor hands to the launcher.
pub struct JobData<I, O> {
    /// Snapshot of the input, exposed read-only through [`Job::input`].
    pub input: I,
    /// Output record shared with the runnable.
    pub output: Arc<O>,
    /// The unit of work, bound to `input` and `output`.
    pub runnable: Box<dyn Runnable>,
}

/// An input descriptor: the factory for one job's runnable and output.
///
/// This is the only place that needs workload-specific knowledge.
pub trait JobInput {
    /// Input snapshot type exposed by the job handle.
    type Snapshot;

    /// Output record type populated by the runnable.
    type Output;

    /// Rejects descriptors that cannot produce a meaningful job.
    fn validate(&self) -> Result<(), LaunchError> {
        Ok(())
    }

    /// Produces the snapshot, output record, and runnable for one run.
    fn job_data(&self) -> JobData<Self::Snapshot, Self::Output>;
}

/// Launches a job with the default [`LaunchConfig`].
pub fn launch<D>(descriptor: &D) -> Result<Job<D::Snapshot, D::Output>, LaunchError>
where
    D: JobInput + ?Sized,
{
    launch_with(descriptor, &LaunchConfig::default())
}

/// Launches a job.
///
/// # Errors
///
/// - [`LaunchError::InvalidInput`] if the descriptor fails validation
/// - [`LaunchError::Spawn`] if the OS refuses to create the thread
/// - [`LaunchError::StartupTimeout`] if the startup condition is not reached
///   within `config.startup_timeout`. Cancellation is requested and the
///   thread is detached; it still runs teardown if it ever gets that far.
pub fn launch_with<D>(
    descriptor: &D,
    config: &LaunchConfig,
) -> Result<Job<D::Snapshot, D::Output>, LaunchError>
where
    D: JobInput + ?Sized,
{
    descriptor.validate()?;
    let JobData {
        input,
        output,
        runnable,
    } = descriptor.job_data();

    let job_id = config.job_id.clone().unwrap_or_else(JobId::auto);
    let runnable_name = runnable.name().to_string();
    let control = Arc::new(JobControl::new(
        job_id.clone(),
        Arc::clone(&config.telemetry),
    ));

    let mut builder =
        thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, job_id));
    if let Some(bytes) = config.stack_size {
        builder = builder.stack_size(bytes);
    }
    let thread_control = Arc::clone(&control);
    let handle = builder.spawn(move || run_job(runnable, thread_control))?;

    info!(job_id = %job_id, runnable = %runnable_name, "Job launched");
    control.emit(TelemetryEvent::JobLaunched {
        job_id: job_id.clone(),
        runnable: runnable_name,
    });

    let timeout = config.startup_timeout;
    let started = match config.startup_policy {
        StartupPolicy::Entered => control.wait_until(Some(timeout), |s| s != State::NotStarted),
        StartupPolicy::SetupFinished => control.wait_until(Some(timeout), |s| s > State::Setup),
    };

    if !started {
        warn!(
            job_id = %job_id,
            state = %control.state(),
            timeout_ms = duration_ms(timeout),
            "Launched thread did not start in time, detaching"
        );
        control.request_cancel();
        control.emit(TelemetryEvent::StartupTimedOut { job_id, timeout });
        drop(handle);
        return Err(LaunchError::StartupTimeout { timeout });
    }

    Ok(Job::new(control, handle, input, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::runnable::HookResult;
    use crate::worker::signal::CancelSignal;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct Quick;

    impl Runnable for Quick {
        fn name(&self) -> &str {
            "quick"
        }

        fn on_working(&mut self, _cancel: &CancelSignal) -> HookResult {
            Ok(true)
        }
    }

    struct QuickInput {
        valid: bool,
    }

    impl JobInput for QuickInput {
        type Snapshot = bool;
        type Output = AtomicU32;

        fn validate(&self) -> Result<(), LaunchError> {
            if self.valid {
                Ok(())
            } else {
                Err(LaunchError::InvalidInput("not valid".to_string()))
            }
        }

        fn job_data(&self) -> JobData<bool, AtomicU32> {
            JobData {
                input: self.valid,
                output: Arc::new(AtomicU32::new(7)),
                runnable: Box::new(Quick),
            }
        }
    }

    #[test]
    fn test_launch_runs_to_completion() {
        let job = launch(&QuickInput { valid: true }).unwrap();
        assert_ne!(job.state(), State::NotStarted);
        assert!(job.wait_for_result(None));
        assert_eq!(job.state(), State::Complete);
        assert!(job.finished());
        assert!(*job.input());
        assert_eq!(job.output().load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_launch_rejects_invalid_input() {
        let result = launch(&QuickInput { valid: false });
        assert!(matches!(result, Err(LaunchError::InvalidInput(_))));
    }

    #[test]
    fn test_launch_uses_configured_job_id() {
        let config = LaunchConfig::default().with_job_id("custom-id");
        let job = launch_with(&QuickInput { valid: true }, &config).unwrap();
        assert_eq!(job.id().as_str(), "custom-id");
        assert!(job.wait_for_result(Some(Duration::from_secs(5))));
    }

    #[test]
    fn test_setup_finished_policy_waits_for_setup() {
        let config = LaunchConfig::default().with_startup_policy(StartupPolicy::SetupFinished);
        let job = launch_with(&QuickInput { valid: true }, &config).unwrap();
        assert!(job.state() > State::Setup);
        assert!(job.wait_for_result(None));
    }

    #[test]
    fn test_launch_with_stack_size() {
        let config = LaunchConfig::default().with_stack_size(512 * 1024);
        let job = launch_with(&QuickInput { valid: true }, &config).unwrap();
        assert!(job.wait_for_result(None));
    }
}
