//! jobworker CLI - Command-line interface
//!
//! This binary runs the sample counting job on the jobworker engine and
//! manages the configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use commands::config::ConfigCommands;
use commands::count::CountArgs;
use std::process;

#[derive(Parser)]
#[command(name = "jobworker")]
#[command(version)]
#[command(about = "Run setup/working/teardown jobs on background threads", long_about = None)]
struct Cli {
    /// Enable debug-level logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count between two numbers on a background job, printing progress
    Count(CountArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Count(args) => commands::count::run(args, cli.debug),
        Commands::Config { command } => commands::config::run(command).map(|()| 0),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => e.exit(),
    }
}
