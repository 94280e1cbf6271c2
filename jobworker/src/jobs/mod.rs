//! Job implementations for the worker engine.
//!
//! This module provides concrete workloads that run on the generic engine
//! from [`crate::worker`].
//!
//! # Jobs
//!
//! - [`CountInput`] - Counts between two numbers with a delay; a sample
//!   workload for exercising states, cancellation, and failure paths
//!
//! # Example
//!
//! ```ignore
//! use jobworker::jobs::CountInput;
//! use jobworker::worker::launch;
//!
//! let job = launch(&CountInput::new(1, 10).with_delay_ms(100))?;
//! assert!(job.wait_for_result(None));
//! assert_eq!(job.output().last(), 10);
//! ```

mod count;

pub use count::{
    CountInput, CountOutput, CountRunnable, DEFAULT_COUNT_DELAY_MS, DEFAULT_COUNT_END,
    DEFAULT_COUNT_START,
};
