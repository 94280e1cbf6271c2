//! Telemetry for job execution observability.
//!
//! The engine emits structured events through a [`TelemetrySink`]. It does not
//! know how they are consumed: a UI, a log, or a test recorder decide how to
//! present them.
//!
//! # Example
//!
//! ```
//! use jobworker::worker::{TelemetryEvent, TelemetrySink};
//!
//! struct PrintingSink;
//!
//! impl TelemetrySink for PrintingSink {
//!     fn emit(&self, event: TelemetryEvent) {
//!         println!("{}: {:?}", event.event_type(), event);
//!     }
//! }
//! ```

use super::error::RunnableError;
use super::id::JobId;
use super::state::State;
use std::time::Duration;

// =============================================================================
// Telemetry Events
// =============================================================================

/// Phase of a runnable in which an error was raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Working,
    Teardown,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Working => write!(f, "working"),
            Self::Teardown => write!(f, "teardown"),
        }
    }
}

/// Events emitted over a job's lifetime.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryEvent {
    /// The background thread was spawned for a job.
    JobLaunched { job_id: JobId, runnable: String },

    /// The execution routine moved the job to a new state.
    StateChanged {
        job_id: JobId,
        from: State,
        to: State,
    },

    /// The caller requested cancellation.
    CancelRequested { job_id: JobId, state: State },

    /// A hook raised an error (returned `Err` or panicked).
    PhaseFailed {
        job_id: JobId,
        phase: Phase,
        error: RunnableError,
    },

    /// The job reached a terminal state.
    JobFinished {
        job_id: JobId,
        state: State,
        elapsed: Duration,
    },

    /// The launcher gave up waiting for the background thread to start.
    StartupTimedOut { job_id: JobId, timeout: Duration },
}

impl TelemetryEvent {
    /// Returns the job ID associated with this event.
    pub fn job_id(&self) -> &JobId {
        match self {
            Self::JobLaunched { job_id, .. }
            | Self::StateChanged { job_id, .. }
            | Self::CancelRequested { job_id, .. }
            | Self::PhaseFailed { job_id, .. }
            | Self::JobFinished { job_id, .. }
            | Self::StartupTimedOut { job_id, .. } => job_id,
        }
    }

    /// Returns a short name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::JobLaunched { .. } => "job_launched",
            Self::StateChanged { .. } => "state_changed",
            Self::CancelRequested { .. } => "cancel_requested",
            Self::PhaseFailed { .. } => "phase_failed",
            Self::JobFinished { .. } => "job_finished",
            Self::StartupTimedOut { .. } => "startup_timed_out",
        }
    }
}

// =============================================================================
// Telemetry Sink Trait
// =============================================================================

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Sink for telemetry events.
///
/// Events are emitted from both the caller's thread and the job's background
/// thread, so implementations must be `Send + Sync`. `emit` runs inline on the
/// background thread between phases and should return quickly.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

/// A sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetrySink;

impl TelemetrySink for NullTelemetrySink {
    #[inline]
    fn emit(&self, _event: TelemetryEvent) {}
}

/// A sink that forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn emit(&self, event: TelemetryEvent) {
        match &event {
            TelemetryEvent::JobLaunched { job_id, runnable } => {
                tracing::debug!(job_id = %job_id, runnable = %runnable, "Job launched");
            }
            TelemetryEvent::StateChanged { job_id, from, to } => {
                tracing::debug!(job_id = %job_id, from = %from, to = %to, "Job state changed");
            }
            TelemetryEvent::CancelRequested { job_id, state } => {
                tracing::debug!(job_id = %job_id, state = %state, "Job cancel requested");
            }
            TelemetryEvent::PhaseFailed {
                job_id,
                phase,
                error,
            } => {
                tracing::debug!(job_id = %job_id, phase = %phase, error = %error, "Job phase raised");
            }
            TelemetryEvent::JobFinished {
                job_id,
                state,
                elapsed,
            } => {
                tracing::debug!(
                    job_id = %job_id,
                    state = %state,
                    elapsed_ms = duration_ms(*elapsed),
                    "Job finished"
                );
            }
            TelemetryEvent::StartupTimedOut { job_id, timeout } => {
                tracing::debug!(job_id = %job_id, timeout = ?timeout, "Job startup timed out");
            }
        }
    }
}
