//! jobworker - run a unit of work on a dedicated background thread
//!
//! This library runs a setup/working/teardown job on its own OS thread and
//! lets the launching thread query its state, wait with a timeout, or abort it
//! cooperatively. Teardown always runs once setup has begun.
//!
//! # High-Level API
//!
//! ```ignore
//! use jobworker::jobs::CountInput;
//! use jobworker::worker::launch;
//! use std::time::Duration;
//!
//! let job = launch(&CountInput::new(1, 5).with_delay_ms(100))?;
//! if !job.wait_for_result(Some(Duration::from_secs(5))) {
//!     job.abort(None);
//! }
//! println!("{} counted to {}", job.state(), job.output().last());
//! ```

pub mod config;
pub mod jobs;
pub mod logging;
pub mod worker;

/// Version of the jobworker library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
