//! Job lifecycle states.
//!
//! A job walks through a fixed sequence of states during its lifetime:
//!
//! ```text
//! not started -> setup +--> working -> teardown +--> complete
//!                      |                 ^      |
//!                      |                 |      |
//!                      +----on error-----+      +--> incomplete
//! ```
//!
//! Only the execution routine on the background thread moves a job between
//! states. [`AtomicState`] is the cell the caller reads while that happens.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

/// The lifecycle state of a job.
///
/// Variants are ordered by normal progression, so `a < b` means `a` comes
/// before `b` on every path through the state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum State {
    /// Thread execution has not begun.
    #[default]
    NotStarted = 0,

    /// Setup for the task is being performed.
    Setup = 1,

    /// Task currently in progress.
    Working = 2,

    /// Teardown after the task is being performed.
    Teardown = 3,

    /// Task completed as requested.
    Complete = 4,

    /// Task did not complete because of an error, a failed phase, or an abort.
    Incomplete = 5,
}

impl State {
    /// All states in progression order.
    pub const ALL: [State; 6] = [
        State::NotStarted,
        State::Setup,
        State::Working,
        State::Teardown,
        State::Complete,
        State::Incomplete,
    ];

    /// Returns the string projection used at the host boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Setup => "setup",
            Self::Working => "working",
            Self::Teardown => "teardown",
            Self::Complete => "complete",
            Self::Incomplete => "incomplete",
        }
    }

    /// Returns true for `Complete` and `Incomplete`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Incomplete)
    }

    /// Returns true if the job successfully completed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Returns true while the background thread is driving the runnable.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Setup | Self::Working | Self::Teardown)
    }

    /// Returns true if the state machine allows moving from `self` to `next`.
    ///
    /// Once `Setup` has been entered, every path passes through `Teardown`.
    pub fn can_transition_to(&self, next: State) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Setup)
                | (Self::Setup, Self::Working)
                | (Self::Setup, Self::Teardown)
                | (Self::Working, Self::Teardown)
                | (Self::Teardown, Self::Complete)
                | (Self::Teardown, Self::Incomplete)
        )
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Setup,
            2 => Self::Working,
            3 => Self::Teardown,
            4 => Self::Complete,
            _ => Self::Incomplete,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job state '{0}'")]
pub struct ParseStateError(String);

impl FromStr for State {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        State::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

/// A [`State`] stored in a single atomic byte.
#[derive(Debug)]
pub struct AtomicState(AtomicU8);

impl AtomicState {
    pub fn new(state: State) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> State {
        State::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: State) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Atomically replaces `current` with `new`.
    ///
    /// Returns the state actually found on failure.
    pub fn compare_exchange(&self, current: State, new: State) -> Result<State, State> {
        self.0
            .compare_exchange(
                current as u8,
                new as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(State::from_u8)
            .map_err(State::from_u8)
    }
}

impl Default for AtomicState {
    fn default() -> Self {
        Self::new(State::NotStarted)
    }
}
