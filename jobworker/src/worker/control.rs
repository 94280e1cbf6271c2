//! Shared control block for a single job.
//!
//! A [`JobControl`] is created by the launcher, shared by `Arc` with the
//! execution routine on the background thread, and freed when the last holder
//! lets go. The caller reads it while the background thread writes it, so every
//! field is either atomic or a write-once cell.
//!
//! Waiters block on a condition variable that is notified on every state
//! transition. The mutex guarding it protects no data; it only orders the
//! predicate check against the notification so wake-ups are never lost.

use super::error::JobError;
use super::id::JobId;
use super::signal::CancelSignal;
use super::state::{AtomicState, State};
use super::telemetry::{TelemetryEvent, TelemetrySink};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// Thread-safe record of a job's state, cancellation flag, and working time.
pub struct JobControl {
    id: JobId,
    state: AtomicState,
    cancel: CancelSignal,
    /// Monotonic start of `Runnable::on_working`.
    start_working: OnceLock<Instant>,
    /// Monotonic end of `Runnable::on_working`.
    end_working: OnceLock<Instant>,
    transition_lock: Mutex<()>,
    transition_cv: Condvar,
    state_tx: watch::Sender<State>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl JobControl {
    /// Creates a control block in `NotStarted` with cancellation armed.
    pub(crate) fn new(id: JobId, telemetry: Arc<dyn TelemetrySink>) -> Self {
        let (state_tx, _) = watch::channel(State::NotStarted);
        Self {
            id,
            state: AtomicState::new(State::NotStarted),
            cancel: CancelSignal::new(),
            start_working: OnceLock::new(),
            end_working: OnceLock::new(),
            transition_lock: Mutex::new(()),
            transition_cv: Condvar::new(),
            state_tx,
            telemetry,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        self.state.load()
    }

    /// Returns true once the job reached `Complete` or `Incomplete`.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// The cooperative cancellation flag handed to `Runnable::on_working`.
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Requests cancellation.
    ///
    /// Returns true if this call flipped the flag.
    pub fn request_cancel(&self) -> bool {
        let flipped = self.cancel.request_cancel();
        if flipped {
            self.emit(TelemetryEvent::CancelRequested {
                job_id: self.id.clone(),
                state: self.state(),
            });
        }
        flipped
    }

    /// Returns the time spent in the working phase.
    ///
    /// - zero before `Working` (and whenever working never started)
    /// - a live estimate while `Working`
    /// - frozen at `end - start` from `Teardown` onwards
    pub fn elapsed(&self) -> Duration {
        let state = self.state();
        let Some(start) = self.start_working.get().copied() else {
            return Duration::ZERO;
        };
        match state {
            State::NotStarted | State::Setup => Duration::ZERO,
            State::Working => {
                // Sample the clock before checking for an end mark so a live
                // reading never exceeds the frozen one.
                let now = Instant::now();
                match self.end_working.get() {
                    Some(end) => end.saturating_duration_since(start),
                    None => now.saturating_duration_since(start),
                }
            }
            State::Teardown | State::Complete | State::Incomplete => self
                .end_working
                .get()
                .map(|end| end.saturating_duration_since(start))
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Subscribes to state transitions.
    ///
    /// The receiver starts at the current state and sees every later
    /// transition's latest value.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state_tx.subscribe()
    }

    /// Blocks until `pred` holds for the current state or `timeout` elapses.
    ///
    /// `None` waits without bound. Returns whether `pred` held on return.
    pub fn wait_until(&self, timeout: Option<Duration>, pred: impl Fn(State) -> bool) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut guard = self.transition_lock.lock();
        loop {
            if pred(self.state()) {
                return true;
            }
            match deadline {
                Some(deadline) => {
                    if self
                        .transition_cv
                        .wait_until(&mut guard, deadline)
                        .timed_out()
                    {
                        return pred(self.state());
                    }
                }
                // Unbounded, or a deadline too far out to represent.
                None => self.transition_cv.wait(&mut guard),
            }
        }
    }

    // -------------------------------------------------------------------------
    // Execution routine side
    // -------------------------------------------------------------------------

    /// Claims the control for execution, moving `NotStarted -> Setup`.
    ///
    /// A control block drives exactly one execution; any later claim fails.
    pub(crate) fn begin(&self) -> Result<(), JobError> {
        match self.state.compare_exchange(State::NotStarted, State::Setup) {
            Ok(_) => {
                self.publish(State::NotStarted, State::Setup);
                Ok(())
            }
            Err(found) => {
                error!(job_id = %self.id, state = %found, "Job control reused after start");
                Err(JobError::AlreadyStarted(self.id.clone()))
            }
        }
    }

    /// Moves to `next`, which must be reachable from the current state.
    pub(crate) fn transition(&self, next: State) {
        let current = self.state();
        if !current.can_transition_to(next) {
            error!(
                job_id = %self.id,
                from = %current,
                to = %next,
                "Rejected illegal job state transition"
            );
            debug_assert!(false, "illegal transition {} -> {}", current, next);
            return;
        }
        self.state.store(next);
        self.publish(current, next);
    }

    /// Records the start of the working phase.
    pub(crate) fn mark_working_started(&self) {
        if self.start_working.set(Instant::now()).is_err() {
            debug_assert!(false, "start of working recorded twice");
        }
    }

    /// Records the end of the working phase.
    pub(crate) fn mark_working_ended(&self) {
        if self.end_working.set(Instant::now()).is_err() {
            debug_assert!(false, "end of working recorded twice");
        }
    }

    /// Forces `Incomplete` when execution stopped in an active state.
    ///
    /// Used when the execution routine unwinds outside a hook. Returns true if
    /// the state was changed.
    pub(crate) fn abandon(&self) -> bool {
        let current = self.state();
        if !current.is_active() {
            return false;
        }
        error!(
            job_id = %self.id,
            state = %current,
            "Job stopped without reaching a final state, marking incomplete"
        );
        self.state.store(State::Incomplete);
        self.publish(current, State::Incomplete);
        true
    }

    /// Hands `event` to the telemetry sink. A panicking sink loses the event
    /// and nothing else.
    pub(crate) fn emit(&self, event: TelemetryEvent) {
        let event_type = event.event_type();
        if panic::catch_unwind(AssertUnwindSafe(|| self.telemetry.emit(event))).is_err() {
            warn!(job_id = %self.id, event = event_type, "Telemetry sink panicked, event dropped");
        }
    }

    fn publish(&self, from: State, to: State) {
        debug!(job_id = %self.id, from = %from, to = %to, "Job state changed");
        {
            let _guard = self.transition_lock.lock();
            self.transition_cv.notify_all();
        }
        self.state_tx.send_replace(to);
        self.emit(TelemetryEvent::StateChanged {
            job_id: self.id.clone(),
            from,
            to,
        });
    }
}

impl fmt::Debug for JobControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobControl")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("cancel_requested", &self.cancel.is_cancel_requested())
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::telemetry::NullTelemetrySink;
    use std::thread;

    fn control() -> JobControl {
        JobControl::new(JobId::new("test"), Arc::new(NullTelemetrySink))
    }

    #[test]
    fn test_new_control_is_not_started_and_armed() {
        let control = control();
        assert_eq!(control.state(), State::NotStarted);
        assert!(control.cancel_signal().keep_going());
        assert_eq!(control.elapsed(), Duration::ZERO);
        assert!(!control.is_finished());
    }

    #[test]
    fn test_begin_only_once() {
        let control = control();
        assert!(control.begin().is_ok());
        assert_eq!(control.state(), State::Setup);
        assert_eq!(
            control.begin(),
            Err(JobError::AlreadyStarted(JobId::new("test")))
        );
        assert_eq!(control.state(), State::Setup);
    }

    #[test]
    fn test_elapsed_follows_state() {
        let control = control();
        control.begin().unwrap();
        assert_eq!(control.elapsed(), Duration::ZERO);

        control.transition(State::Working);
        control.mark_working_started();
        thread::sleep(Duration::from_millis(20));
        let live = control.elapsed();
        assert!(live >= Duration::from_millis(20));

        control.mark_working_ended();
        control.transition(State::Teardown);
        let frozen = control.elapsed();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(control.elapsed(), frozen);
        assert!(frozen >= live);

        control.transition(State::Complete);
        assert_eq!(control.elapsed(), frozen);
    }

    #[test]
    fn test_elapsed_zero_when_working_skipped() {
        let control = control();
        control.begin().unwrap();
        control.transition(State::Teardown);
        control.transition(State::Incomplete);
        assert_eq!(control.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_live_reading_never_exceeds_frozen() {
        let control = control();
        control.begin().unwrap();
        control.transition(State::Working);
        control.mark_working_started();
        thread::sleep(Duration::from_millis(5));
        let live = control.elapsed();

        // End recorded while the state still reads Working.
        control.mark_working_ended();
        let frozen_in_working = control.elapsed();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(control.elapsed(), frozen_in_working);
        assert!(live <= frozen_in_working);

        control.transition(State::Teardown);
        assert_eq!(control.elapsed(), frozen_in_working);
    }

    struct PanickingSink;

    impl TelemetrySink for PanickingSink {
        fn emit(&self, _event: TelemetryEvent) {
            panic!("sink failure");
        }
    }

    #[test]
    fn test_panicking_sink_does_not_stop_transitions() {
        let control = JobControl::new(JobId::new("sink"), Arc::new(PanickingSink));
        control.begin().unwrap();
        control.transition(State::Teardown);
        control.transition(State::Complete);
        assert!(control.request_cancel());
        assert_eq!(control.state(), State::Complete);
        assert!(control.wait_until(Some(Duration::ZERO), |s| s.is_terminal()));
    }

    #[test]
    fn test_abandon_forces_incomplete_from_active_state() {
        let control = Arc::new(control());
        let rx = control.subscribe();
        control.begin().unwrap();
        control.transition(State::Working);

        let waiter = Arc::clone(&control);
        let handle = thread::spawn(move || waiter.wait_until(None, |s| s.is_terminal()));
        thread::sleep(Duration::from_millis(10));

        assert!(control.abandon());
        assert!(handle.join().unwrap());
        assert_eq!(control.state(), State::Incomplete);
        assert_eq!(*rx.borrow(), State::Incomplete);
    }

    #[test]
    fn test_abandon_leaves_idle_and_final_states_alone() {
        let control = control();
        assert!(!control.abandon());
        assert_eq!(control.state(), State::NotStarted);

        control.begin().unwrap();
        control.transition(State::Teardown);
        control.transition(State::Complete);
        assert!(!control.abandon());
        assert_eq!(control.state(), State::Complete);
    }

    #[test]
    fn test_request_cancel_reports_first_flip() {
        let control = control();
        assert!(control.request_cancel());
        assert!(!control.request_cancel());
        assert!(control.cancel_signal().is_cancel_requested());
    }

    #[test]
    fn test_wait_until_times_out() {
        let control = control();
        let start = Instant::now();
        assert!(!control.wait_until(Some(Duration::from_millis(30)), |s| s.is_terminal()));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_until_wakes_on_transition() {
        let control = Arc::new(control());
        let writer = Arc::clone(&control);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.begin().unwrap();
            writer.transition(State::Teardown);
            writer.transition(State::Complete);
        });

        assert!(control.wait_until(None, |s| s.is_terminal()));
        assert_eq!(control.state(), State::Complete);
        handle.join().unwrap();
    }

    #[test]
    fn test_subscribe_sees_latest_state() {
        let control = control();
        let rx = control.subscribe();
        assert_eq!(*rx.borrow(), State::NotStarted);
        control.begin().unwrap();
        assert_eq!(*rx.borrow(), State::Setup);
    }
}
