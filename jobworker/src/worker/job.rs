//! Job handle for state queries, waiting, and cancellation.
//!
//! A [`Job`] is returned by [`launch`](super::launch). It owns the background
//! thread and the shared [`JobControl`], plus the input snapshot and output
//! handle for the run.
//!
//! # Dropping a running job blocks
//!
//! When a `Job` is dropped before it has finished, it requests cancellation and
//! then waits *without a bound* for the background thread to end. This keeps
//! threads and shared state from outliving their handle, at the cost of
//! stalling the dropping thread if the runnable ignores cancellation. Callers
//! that cannot block should call [`Job::abort`] with a timeout first and keep
//! the handle alive if it returns false.
//!
//! # Example
//!
//! ```ignore
//! use jobworker::worker::launch;
//! use std::time::Duration;
//!
//! let job = launch(&input)?;
//!
//! // Check state without waiting
//! println!("{} after {:?}", job.state(), job.elapsed());
//!
//! // Wait up to a minute for a successful finish
//! if !job.wait_for_result(Some(Duration::from_secs(60))) {
//!     job.abort(None);
//! }
//! ```

use super::control::JobControl;
use super::error::JobError;
use super::id::JobId;
use super::state::State;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How often a blocked waiter checks whether the background thread is gone.
const THREAD_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Converts host-style signed seconds into a wait timeout.
///
/// Negative values mean "wait forever" and map to `None`.
pub fn timeout_from_secs(secs: i64) -> Option<Duration> {
    u64::try_from(secs).ok().map(Duration::from_secs)
}

/// Handle to one launched job.
pub struct Job<I, O> {
    control: Arc<JobControl>,
    thread: Mutex<Option<JoinHandle<Result<(), JobError>>>>,
    /// What the execution routine returned, once joined.
    outcome: OnceLock<Result<(), JobError>>,
    input: I,
    output: Arc<O>,
}

impl<I, O> Job<I, O> {
    pub(crate) fn new(
        control: Arc<JobControl>,
        thread: JoinHandle<Result<(), JobError>>,
        input: I,
        output: Arc<O>,
    ) -> Self {
        Self {
            control,
            thread: Mutex::new(Some(thread)),
            outcome: OnceLock::new(),
            input,
            output,
        }
    }

    pub fn id(&self) -> &JobId {
        self.control.id()
    }

    /// Returns the current state. Updated live by the background thread.
    pub fn state(&self) -> State {
        self.control.state()
    }

    /// Returns the time spent in the working phase.
    ///
    /// Setup and teardown time is not included. See [`JobControl::elapsed`].
    pub fn elapsed(&self) -> Duration {
        self.control.elapsed()
    }

    /// Copy of the job-specific input, fixed at launch.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Job-specific output record, updated live by the background thread.
    pub fn output(&self) -> &Arc<O> {
        &self.output
    }

    pub fn control(&self) -> &Arc<JobControl> {
        &self.control
    }

    /// Returns true once the job is no longer running, with any outcome.
    ///
    /// When this returns true the background thread has been joined.
    pub fn finished(&self) -> bool {
        if self.control.is_finished() {
            self.reap();
            true
        } else {
            false
        }
    }

    /// Waits for the job to finish.
    ///
    /// `None` waits without bound. On expiry returns false without cancelling
    /// anything; the caller may wait again or check [`finished`](Self::finished).
    ///
    /// Returns true only if the job finished in `Complete`. A job that never
    /// left `NotStarted` returns false immediately.
    pub fn wait_for_result(&self, timeout: Option<Duration>) -> bool {
        if self.state() == State::NotStarted {
            return false;
        }
        if !self.wait_terminal(timeout) {
            return false;
        }
        self.reap();
        self.state() == State::Complete
    }

    /// Waits for a final state, or for the background thread to exit without
    /// reaching one.
    fn wait_terminal(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        loop {
            let slice = match deadline {
                Some(deadline) => deadline
                    .saturating_duration_since(Instant::now())
                    .min(THREAD_CHECK_INTERVAL),
                None => THREAD_CHECK_INTERVAL,
            };
            if self.control.wait_until(Some(slice), |s| s.is_terminal()) {
                return true;
            }
            if self.thread_exited() {
                self.reap();
                return self.control.is_finished();
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return false;
            }
        }
    }

    fn thread_exited(&self) -> bool {
        self.thread
            .lock()
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Requests cancellation, then waits as [`wait_for_result`](Self::wait_for_result).
    ///
    /// Returns true if the job is finished when the call returns. Calling it
    /// again after the job finished changes nothing.
    pub fn abort(&self, timeout: Option<Duration>) -> bool {
        if self.control.request_cancel() {
            info!(job_id = %self.id(), state = %self.state(), "Job abort requested");
        }
        self.wait_for_result(timeout);
        self.finished()
    }

    /// Blocks until the background thread ends and returns its result.
    ///
    /// `Ok` carries the final state (`Complete` or `Incomplete`); `Err` carries
    /// the error a hook raised, which `wait_for_result` does not expose.
    pub fn wait(&self) -> Result<State, JobError> {
        self.reap();
        match self.outcome.get() {
            Some(Ok(())) | None => Ok(self.state()),
            Some(Err(e)) => Err(e.clone()),
        }
    }

    /// Returns the error raised by a hook, once the job has finished.
    pub fn error(&self) -> Option<JobError> {
        if !self.finished() {
            return None;
        }
        self.outcome.get().and_then(|r| r.as_ref().err().cloned())
    }

    /// Subscribes to state transitions for async observers.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.control.subscribe()
    }

    /// Async counterpart of [`wait_for_result`](Self::wait_for_result).
    ///
    /// Bounded waits need a Tokio runtime with the time driver enabled.
    pub async fn wait_async(&self, timeout: Option<Duration>) -> bool {
        if self.state() == State::NotStarted {
            return false;
        }
        let mut rx = self.subscribe();
        let reached = async move { rx.wait_for(|s| s.is_terminal()).await.is_ok() };
        let finished = match timeout {
            Some(timeout) => tokio::time::timeout(timeout, reached)
                .await
                .unwrap_or(false),
            None => reached.await,
        };
        if !finished {
            return false;
        }
        self.reap();
        self.state() == State::Complete
    }

    /// Joins the background thread if it has not been joined yet.
    ///
    /// A thread that ended without a final state leaves the job `Incomplete`.
    fn reap(&self) {
        let mut thread = self.thread.lock();
        if let Some(handle) = thread.take() {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(JobError::Aborted(self.id().clone())));
            if self.control.abandon() {
                warn!(job_id = %self.id(), "Background thread exited early");
            }
            let _ = self.outcome.set(outcome);
        }
    }
}

impl<I, O> Drop for Job<I, O> {
    fn drop(&mut self) {
        if !self.finished() {
            debug!(job_id = %self.id(), state = %self.state(), "Aborting unfinished job on drop");
            self.abort(None);
        }
        self.reap();
    }
}

impl<I, O> fmt::Debug for Job<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", self.id())
            .field("state", &self.state())
            .field("elapsed", &self.elapsed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::telemetry::NullTelemetrySink;
    use std::thread;

    /// A job whose thread dies mid-run without touching the control again.
    fn job_with_dead_thread() -> Job<(), ()> {
        let control = Arc::new(JobControl::new(JobId::new("dead"), Arc::new(NullTelemetrySink)));
        control.begin().unwrap();
        control.transition(State::Working);
        let handle = thread::spawn(|| -> Result<(), JobError> { panic!("routine died") });
        Job::new(control, handle, (), Arc::new(()))
    }

    #[test]
    fn test_unbounded_wait_returns_when_thread_dies() {
        let job = job_with_dead_thread();
        assert!(!job.wait_for_result(None));
        assert_eq!(job.state(), State::Incomplete);
        assert!(job.finished());
        assert_eq!(job.wait(), Err(JobError::Aborted(JobId::new("dead"))));
    }

    #[test]
    fn test_abort_and_drop_return_when_thread_dies() {
        let job = job_with_dead_thread();
        assert!(job.abort(None));
        assert_eq!(job.state(), State::Incomplete);
        drop(job);

        let job = job_with_dead_thread();
        drop(job);
    }

    #[test]
    fn test_bounded_wait_still_times_out_on_live_thread() {
        let control = Arc::new(JobControl::new(JobId::new("live"), Arc::new(NullTelemetrySink)));
        control.begin().unwrap();
        let release = Arc::clone(&control);
        let handle = thread::spawn(move || -> Result<(), JobError> {
            release.wait_until(None, |s| s.is_terminal());
            Ok(())
        });
        let job = Job::new(Arc::clone(&control), handle, (), Arc::new(()));

        let start = Instant::now();
        assert!(!job.wait_for_result(Some(Duration::from_millis(120))));
        assert!(start.elapsed() >= Duration::from_millis(120));
        assert_eq!(job.state(), State::Setup);

        control.transition(State::Teardown);
        control.transition(State::Complete);
        assert!(job.wait_for_result(None));
    }

    #[test]
    fn test_timeout_from_secs() {
        assert_eq!(timeout_from_secs(-1), None);
        assert_eq!(timeout_from_secs(i64::MIN), None);
        assert_eq!(timeout_from_secs(0), Some(Duration::ZERO));
        assert_eq!(timeout_from_secs(60), Some(Duration::from_secs(60)));
    }
}
