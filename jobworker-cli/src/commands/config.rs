//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, and `config init` for inspecting and
//! creating the configuration file from the command line.

use clap::Subcommand;
use jobworker::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file values over defaults)
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init { force } => run_init(force),
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Show the effective configuration.
fn run_show() -> Result<(), CliError> {
    let path = config_file_path();
    let config = ConfigFile::load_from(&path)?;

    if path.exists() {
        println!("Configuration from {}", path.display());
    } else {
        println!("No configuration file at {} (showing defaults)", path.display());
    }
    println!();
    print!("{}", format_settings(&config));

    Ok(())
}

/// Write the default configuration file.
fn run_init(force: bool) -> Result<(), CliError> {
    let path = config_file_path();

    if path.exists() && !force {
        println!("Configuration file already exists at {}", path.display());
        println!("Use 'jobworker config init --force' to overwrite it.");
        return Ok(());
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());

    Ok(())
}

fn format_settings(config: &ConfigFile) -> String {
    let stack_size = config
        .launch
        .stack_size
        .map(|bytes| bytes.to_string())
        .unwrap_or_else(|| "(platform default)".to_string());

    format!(
        "[launch]\n  startup_timeout_ms = {}\n  startup_policy = {}\n  thread_name_prefix = {}\n  stack_size = {}\n\n[logging]\n  directory = {}\n  file = {}\n",
        config.launch.startup_timeout_ms,
        config.launch.startup_policy,
        config.launch.thread_name_prefix,
        stack_size,
        config.logging.directory.display(),
        config.logging.file,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_settings_lists_every_key() {
        let text = format_settings(&ConfigFile::default());
        for key in [
            "startup_timeout_ms = 1000",
            "startup_policy = entered",
            "thread_name_prefix = job",
            "stack_size = (platform default)",
            "file = jobworker.log",
        ] {
            assert!(text.contains(key), "missing '{}' in:\n{}", key, text);
        }
    }
}
