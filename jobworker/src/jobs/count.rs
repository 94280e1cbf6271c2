//! Counting job.
//!
//! [`CountInput`] describes a job that counts from `start` to `end`
//! (inclusive), sleeping `delay_ms` between steps. It does no useful work; it
//! exists to drive the engine through every state with observable timing.
//!
//! # Phases
//!
//! - **Setup**: sleep `delay_ms`.
//! - **Working**: for each value, publish it to [`CountOutput::last`], stop
//!   with failure if cancellation was requested, then sleep `delay_ms`.
//! - **Teardown**: sleep `delay_ms`.
//!
//! If `fail_after` names `Setup`, `Working`, or `Teardown`, that phase reports
//! failure when it ends.

use crate::worker::{CancelSignal, HookResult, JobData, JobInput, LaunchError, Runnable, State};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Default first value.
pub const DEFAULT_COUNT_START: i64 = 1;

/// Default last value.
pub const DEFAULT_COUNT_END: i64 = 100;

/// Default delay for each phase and each step.
pub const DEFAULT_COUNT_DELAY_MS: u64 = 1000;

/// Input descriptor for the counting job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountInput {
    /// First value counted (inclusive).
    pub start: i64,
    /// Last value counted (inclusive).
    pub end: i64,
    /// Sleep used in setup, teardown, and between steps.
    pub delay_ms: u64,
    /// Phase that reports failure when it ends, if any.
    pub fail_after: Option<State>,
}

impl CountInput {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_fail_after(mut self, state: State) -> Self {
        self.fail_after = Some(state);
        self
    }

    fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn passes(&self, phase: State) -> bool {
        self.fail_after != Some(phase)
    }
}

impl Default for CountInput {
    fn default() -> Self {
        Self {
            start: DEFAULT_COUNT_START,
            end: DEFAULT_COUNT_END,
            delay_ms: DEFAULT_COUNT_DELAY_MS,
            fail_after: None,
        }
    }
}

impl fmt::Display for CountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Count(start={}, end={}, delay_ms={})",
            self.start, self.end, self.delay_ms
        )
    }
}

impl JobInput for CountInput {
    type Snapshot = CountInput;
    type Output = CountOutput;

    fn validate(&self) -> Result<(), LaunchError> {
        if self.end < self.start {
            return Err(LaunchError::InvalidInput(format!(
                "count end {} is before start {}",
                self.end, self.start
            )));
        }
        if let Some(state) = self.fail_after {
            if !matches!(state, State::Setup | State::Working | State::Teardown) {
                return Err(LaunchError::InvalidInput(format!(
                    "fail_after must name setup, working, or teardown, not '{}'",
                    state
                )));
            }
        }
        Ok(())
    }

    fn job_data(&self) -> JobData<CountInput, CountOutput> {
        let output = Arc::new(CountOutput::default());
        JobData {
            input: self.clone(),
            output: Arc::clone(&output),
            runnable: Box::new(CountRunnable::new(self.clone(), output)),
        }
    }
}

/// Output record for the counting job.
#[derive(Debug, Default)]
pub struct CountOutput {
    last: AtomicI64,
}

impl CountOutput {
    /// The last value counted by the job thread. Zero before counting starts.
    pub fn last(&self) -> i64 {
        self.last.load(Ordering::Acquire)
    }
}

/// The counting unit of work.
pub struct CountRunnable {
    input: CountInput,
    output: Arc<CountOutput>,
}

impl CountRunnable {
    pub fn new(input: CountInput, output: Arc<CountOutput>) -> Self {
        Self { input, output }
    }
}

impl Runnable for CountRunnable {
    fn name(&self) -> &str {
        "count"
    }

    fn on_setup(&mut self) -> HookResult {
        thread::sleep(self.input.delay());
        Ok(self.input.passes(State::Setup))
    }

    fn on_working(&mut self, cancel: &CancelSignal) -> HookResult {
        for i in self.input.start..=self.input.end {
            self.output.last.store(i, Ordering::Release);
            trace!(value = i, "Counted");
            if cancel.is_cancel_requested() {
                return Ok(false);
            }
            thread::sleep(self.input.delay());
        }
        Ok(self.input.passes(State::Working))
    }

    fn on_teardown(&mut self) -> HookResult {
        thread::sleep(self.input.delay());
        Ok(self.input.passes(State::Teardown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_inline(input: &CountInput, cancel: &CancelSignal) -> (bool, bool, bool, i64) {
        let output = Arc::new(CountOutput::default());
        let mut runnable = CountRunnable::new(input.clone(), Arc::clone(&output));
        let setup = runnable.on_setup().unwrap();
        let working = runnable.on_working(cancel).unwrap();
        let teardown = runnable.on_teardown().unwrap();
        (setup, working, teardown, output.last())
    }

    #[test]
    fn test_defaults() {
        let input = CountInput::default();
        assert_eq!(input.start, 1);
        assert_eq!(input.end, 100);
        assert_eq!(input.delay_ms, 1000);
        assert!(input.fail_after.is_none());
    }

    #[test]
    fn test_display() {
        let input = CountInput::new(1, 5).with_delay_ms(10);
        assert_eq!(input.to_string(), "Count(start=1, end=5, delay_ms=10)");
    }

    #[test]
    fn test_counts_through_range() {
        let input = CountInput::new(3, 7).with_delay_ms(0);
        let result = run_inline(&input, &CancelSignal::new());
        assert_eq!(result, (true, true, true, 7));
    }

    #[test]
    fn test_single_value_range() {
        let input = CountInput::new(4, 4).with_delay_ms(0);
        let result = run_inline(&input, &CancelSignal::new());
        assert_eq!(result, (true, true, true, 4));
    }

    #[test]
    fn test_fail_after_each_phase() {
        let input = CountInput::new(1, 3).with_delay_ms(0);
        let cancel = CancelSignal::new();

        let setup = run_inline(&input.clone().with_fail_after(State::Setup), &cancel);
        assert_eq!(setup, (false, true, true, 3));

        let working = run_inline(&input.clone().with_fail_after(State::Working), &cancel);
        assert_eq!(working, (true, false, true, 3));

        let teardown = run_inline(&input.with_fail_after(State::Teardown), &cancel);
        assert_eq!(teardown, (true, true, false, 3));
    }

    #[test]
    fn test_cancelled_before_working_stops_after_first_value() {
        let cancel = CancelSignal::new();
        cancel.request_cancel();
        let input = CountInput::new(10, 20).with_delay_ms(0);

        let (_, working, _, last) = run_inline(&input, &cancel);
        assert!(!working);
        assert_eq!(last, 10);
    }

    #[test]
    fn test_validate_rejects_reversed_range() {
        let result = CountInput::new(5, 1).validate();
        assert!(matches!(result, Err(LaunchError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_terminal_fail_after() {
        let input = CountInput::new(1, 2).with_fail_after(State::Complete);
        assert!(input.validate().is_err());
        assert!(CountInput::new(1, 2)
            .with_fail_after(State::Working)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_job_data_shares_output() {
        let input = CountInput::new(1, 2).with_delay_ms(0);
        let data = input.job_data();
        assert_eq!(data.input, input);
        assert_eq!(data.output.last(), 0);
        assert_eq!(data.runnable.name(), "count");
    }
}
