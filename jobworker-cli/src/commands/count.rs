//! Count command - run the counting job in the foreground.
//!
//! Launches the job, prints progress at each poll, and optionally aborts it
//! after a delay or an overall timeout.

use clap::Args;
use jobworker::jobs::{
    CountInput, CountOutput, DEFAULT_COUNT_DELAY_MS, DEFAULT_COUNT_END, DEFAULT_COUNT_START,
};
use jobworker::worker::{launch_with, timeout_from_secs, Job, State};
use std::time::{Duration, Instant};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Exit code when the job ends `Incomplete`.
pub const EXIT_INCOMPLETE: i32 = 2;

/// Arguments for the count command.
#[derive(Debug, Args)]
pub struct CountArgs {
    /// First number to count (inclusive)
    #[arg(long, default_value_t = DEFAULT_COUNT_START, allow_negative_numbers = true)]
    pub start: i64,

    /// Last number to count (inclusive)
    #[arg(long, default_value_t = DEFAULT_COUNT_END, allow_negative_numbers = true)]
    pub end: i64,

    /// Delay in milliseconds for setup, teardown, and each counting step
    #[arg(long, default_value_t = DEFAULT_COUNT_DELAY_MS)]
    pub delay_ms: u64,

    /// Make a phase fail when it ends (setup, working, or teardown)
    #[arg(long)]
    pub fail_after: Option<State>,

    /// Abort if the job has not finished after this many seconds (negative waits forever)
    #[arg(long, allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Request cancellation this many milliseconds after launch
    #[arg(long)]
    pub abort_after_ms: Option<u64>,

    /// Progress polling interval in milliseconds
    #[arg(long, default_value_t = 250)]
    pub poll_ms: u64,
}

impl CountArgs {
    fn input(&self) -> CountInput {
        CountInput {
            start: self.start,
            end: self.end,
            delay_ms: self.delay_ms,
            fail_after: self.fail_after,
        }
    }
}

/// Run the count command. Returns the process exit code.
pub fn run(args: CountArgs, debug: bool) -> Result<i32, CliError> {
    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("count");

    let input = args.input();
    let job = launch_with(&input, &runner.launch_config())?;
    println!("Launched {} as {}", input, job.id());

    let launched_at = Instant::now();
    let poll = Duration::from_millis(args.poll_ms.max(1));
    let timeout = args.timeout.and_then(timeout_from_secs);
    let abort_after = args.abort_after_ms.map(Duration::from_millis);
    let mut abort_sent = false;

    while !job.wait_for_result(Some(poll)) && !job.finished() {
        print_progress(&job);

        let waited = launched_at.elapsed();
        if !abort_sent && abort_after.is_some_and(|after| waited >= after) {
            println!("Requesting abort after {:?}", waited);
            job.abort(Some(Duration::ZERO));
            abort_sent = true;
        }
        if timeout.is_some_and(|limit| waited >= limit) {
            println!("Timed out after {:?}, aborting", waited);
            job.abort(None);
            break;
        }
    }

    let state = job.state();
    println!();
    println!("Final state: {}", state);
    println!("Last value:  {}", job.output().last());
    println!("Elapsed:     {:.3}s", job.elapsed().as_secs_f64());
    if let Some(error) = job.error() {
        println!("Error:       {}", error);
    }
    info!(job_id = %job.id(), state = %state, "Count command finished");

    Ok(exit_code(state))
}

fn print_progress(job: &Job<CountInput, CountOutput>) {
    println!(
        "  {:<11} last={:<6} elapsed={:.1}s",
        job.state().as_str(),
        job.output().last(),
        job.elapsed().as_secs_f64()
    );
}

/// Maps a final state to the process exit code.
pub fn exit_code(state: State) -> i32 {
    if state == State::Complete {
        0
    } else {
        EXIT_INCOMPLETE
    }
}
