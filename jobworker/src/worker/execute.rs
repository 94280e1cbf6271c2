//! The execution routine run on each job's background thread.
//!
//! Drives a [`Runnable`] through setup, working, and teardown while keeping
//! the shared [`JobControl`] current. Teardown is reached on every path once
//! setup has been entered: hook errors and panics are caught at the phase
//! boundary, recorded, and only surfaced after teardown has run.

use super::control::JobControl;
use super::error::{JobError, RunnableError};
use super::runnable::{HookResult, Runnable};
use super::state::State;
use super::telemetry::{duration_ms, Phase, TelemetryEvent};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs `runnable` to completion against `control`.
///
/// Returns the first error raised by a hook, if any. The job's pass/fail
/// outcome is always available from the control's final state regardless.
///
/// If the routine itself unwinds outside a hook, teardown is still attempted
/// when it has not been reached, the job is forced to `Incomplete`, and
/// [`JobError::Aborted`] is returned.
pub(crate) fn run_job(
    mut runnable: Box<dyn Runnable>,
    control: Arc<JobControl>,
) -> Result<(), JobError> {
    control.begin()?;

    match panic::catch_unwind(AssertUnwindSafe(|| drive(runnable.as_mut(), &control))) {
        Ok(result) => result,
        Err(payload) => {
            let error = RunnableError::from_panic(payload);
            error!(job_id = %control.id(), error = %error, "Execution routine panicked");
            if control.state() < State::Teardown {
                control.transition(State::Teardown);
                if let Err(e) = guarded(|| runnable.on_teardown()) {
                    report_raised(&control, Phase::Teardown, &e);
                }
            }
            control.abandon();
            Err(JobError::Aborted(control.id().clone()))
        }
    }
}

fn drive(runnable: &mut dyn Runnable, control: &JobControl) -> Result<(), JobError> {
    let mut raised = None;
    let mut success = match guarded(|| runnable.on_setup()) {
        Ok(ok) => ok,
        Err(e) => {
            report_raised(control, Phase::Setup, &e);
            raised = Some(JobError::Setup(e));
            false
        }
    };

    if success {
        control.transition(State::Working);
        control.mark_working_started();
        let outcome = guarded(|| runnable.on_working(control.cancel_signal()));
        control.mark_working_ended();

        success = match outcome {
            Ok(ok) => ok,
            Err(e) => {
                report_raised(control, Phase::Working, &e);
                raised = Some(JobError::Working(e));
                false
            }
        };
    }

    // Reached on every path once setup was entered.
    control.transition(State::Teardown);
    match guarded(|| runnable.on_teardown()) {
        Ok(ok) => success = success && ok,
        Err(e) => {
            report_raised(control, Phase::Teardown, &e);
            success = false;
            if raised.is_some() {
                warn!(
                    job_id = %control.id(),
                    error = %e,
                    "Discarding teardown error in favour of earlier error"
                );
            } else {
                raised = Some(JobError::Teardown(e));
            }
        }
    }

    let final_state = if success {
        State::Complete
    } else {
        State::Incomplete
    };
    conclude(control, final_state, raised)
}

fn conclude(
    control: &JobControl,
    final_state: State,
    raised: Option<JobError>,
) -> Result<(), JobError> {
    control.transition(final_state);

    let elapsed = control.elapsed();
    info!(
        job_id = %control.id(),
        state = %final_state,
        elapsed_ms = duration_ms(elapsed),
        "Job finished"
    );
    control.emit(TelemetryEvent::JobFinished {
        job_id: control.id().clone(),
        state: final_state,
        elapsed,
    });

    match raised {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Invokes a hook, converting a panic into [`RunnableError::Panicked`].
fn guarded(hook: impl FnOnce() -> HookResult) -> HookResult {
    panic::catch_unwind(AssertUnwindSafe(hook))
        .unwrap_or_else(|payload| Err(RunnableError::from_panic(payload)))
}

fn report_raised(control: &JobControl, phase: Phase, error: &RunnableError) {
    warn!(job_id = %control.id(), phase = %phase, error = %error, "Job hook raised");
    control.emit(TelemetryEvent::PhaseFailed {
        job_id: control.id().clone(),
        phase,
        error: error.clone(),
    });
}
