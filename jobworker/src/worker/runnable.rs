//! The pluggable unit of work.
//!
//! A [`Runnable`] is moved onto the job's background thread and driven through
//! three hooks. Each hook reports success with `Ok(true)`, failure with
//! `Ok(false)`, and raises with `Err` (a panic counts as raising too).
//!
//! | hook          | on `false` / raise                                  |
//! |---------------|-----------------------------------------------------|
//! | `on_setup`    | `on_working` is skipped, `on_teardown` still runs   |
//! | `on_working`  | `on_teardown` still runs                            |
//! | `on_teardown` | job ends `Incomplete`                               |
//!
//! # Example
//!
//! ```
//! use jobworker::worker::{CancelSignal, Runnable, RunnableError};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! struct Ticker {
//!     ticks: Arc<AtomicU32>,
//! }
//!
//! impl Runnable for Ticker {
//!     fn on_working(&mut self, cancel: &CancelSignal) -> Result<bool, RunnableError> {
//!         for _ in 0..10 {
//!             if cancel.is_cancel_requested() {
//!                 return Ok(false);
//!             }
//!             self.ticks.fetch_add(1, Ordering::SeqCst);
//!         }
//!         Ok(true)
//!     }
//! }
//! ```

use super::error::RunnableError;
use super::signal::CancelSignal;

/// Result type returned by every runnable hook.
pub type HookResult = Result<bool, RunnableError>;

/// A unit of work with setup, working, and teardown phases.
///
/// Implementations own their input snapshot and an `Arc` to the output record
/// they populate. The output record is read concurrently by the caller, so its
/// fields must be atomics or otherwise synchronized.
pub trait Runnable: Send + 'static {
    /// Returns a short label for log output.
    fn name(&self) -> &str {
        "runnable"
    }

    /// Performs preconditions for the task.
    fn on_setup(&mut self) -> HookResult {
        Ok(true)
    }

    /// Performs the task.
    ///
    /// Must check `cancel` periodically and return promptly, usually with
    /// `Ok(false)`, once cancellation has been requested.
    fn on_working(&mut self, cancel: &CancelSignal) -> HookResult;

    /// Releases whatever `on_setup` acquired.
    ///
    /// Called exactly once whenever `on_setup` was entered, including after an
    /// earlier hook raised.
    fn on_teardown(&mut self) -> HookResult {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl Runnable for Minimal {
        fn on_working(&mut self, cancel: &CancelSignal) -> HookResult {
            Ok(cancel.keep_going())
        }
    }

    #[test]
    fn test_default_hooks_succeed() {
        let mut runnable = Minimal;
        assert_eq!(runnable.name(), "runnable");
        assert_eq!(runnable.on_setup(), Ok(true));
        assert_eq!(runnable.on_teardown(), Ok(true));
    }

    #[test]
    fn test_runnable_as_trait_object() {
        let mut boxed: Box<dyn Runnable> = Box::new(Minimal);
        let cancel = CancelSignal::new();
        assert_eq!(boxed.on_working(&cancel), Ok(true));
        cancel.request_cancel();
        assert_eq!(boxed.on_working(&cancel), Ok(false));
    }
}
