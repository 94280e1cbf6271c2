//! Background job engine.
//!
//! This module runs one unit of work on a dedicated OS thread and lets the
//! launching thread observe and control it.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted ──► Setup ──► Working ──► Teardown ──► Complete
//!                  │                      ▲    └──► Incomplete
//!                  └──────────────────────┘
//! ```
//!
//! `Setup` skips straight to `Teardown` when setup fails. Once `Setup` has been
//! entered, `Teardown` always runs, whatever the hooks return or raise.
//!
//! # Core Concepts
//!
//! - **Runnable**: the unit of work. Implements `on_setup`, `on_working`, and
//!   `on_teardown`; each returns whether it succeeded.
//!
//! - **JobControl**: shared state between the caller and the background
//!   thread: current [`State`], cancellation flag, and working-phase times.
//!
//! - **Job**: the caller's handle. Query state and elapsed time, wait with a
//!   timeout, or abort. Dropping an unfinished job aborts it and waits.
//!
//! - **JobInput**: an input descriptor that knows how to build the runnable and
//!   output record for one run.
//!
//! # Example
//!
//! ```ignore
//! use jobworker::worker::{launch, JobData, JobInput, Runnable, CancelSignal, HookResult};
//! use std::sync::Arc;
//!
//! struct Tick;
//!
//! impl Runnable for Tick {
//!     fn on_working(&mut self, cancel: &CancelSignal) -> HookResult {
//!         while cancel.keep_going() {
//!             std::thread::sleep(std::time::Duration::from_millis(10));
//!         }
//!         Ok(false)
//!     }
//! }
//!
//! struct TickInput;
//!
//! impl JobInput for TickInput {
//!     type Snapshot = ();
//!     type Output = ();
//!
//!     fn job_data(&self) -> JobData<(), ()> {
//!         JobData { input: (), output: Arc::new(()), runnable: Box::new(Tick) }
//!     }
//! }
//!
//! let job = launch(&TickInput)?;
//! job.abort(None);
//! ```
//!
//! # Telemetry
//!
//! Lifecycle events are emitted through the [`TelemetrySink`] configured on
//! [`LaunchConfig`]. The default sink discards them.

mod config;
mod control;
mod error;
mod execute;
mod id;
mod job;
mod launch;
mod runnable;
mod signal;
mod state;
mod telemetry;

// State machine
pub use state::{AtomicState, ParseStateError, State};

// Cancellation
pub use signal::CancelSignal;

// Unit of work
pub use runnable::{HookResult, Runnable};

// Shared control and handle
pub use control::JobControl;
pub use job::{timeout_from_secs, Job};

// Launching
pub use config::{LaunchConfig, StartupPolicy, DEFAULT_STARTUP_TIMEOUT, DEFAULT_THREAD_NAME_PREFIX};
pub use launch::{launch, launch_with, JobData, JobInput};

// Errors
pub use error::{JobError, LaunchError, RunnableError};

// Identity and telemetry
pub use id::JobId;
pub use telemetry::{NullTelemetrySink, Phase, TelemetryEvent, TelemetrySink, TracingTelemetrySink};
