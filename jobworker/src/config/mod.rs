//! User configuration for jobworker.
//!
//! Settings are read from `~/.jobworker/config.ini`. A missing file yields
//! defaults; a present file overlays any values it sets.
//!
//! # Example
//!
//! ```ignore
//! use jobworker::config::ConfigFile;
//! use jobworker::worker::LaunchConfig;
//!
//! let config = ConfigFile::load()?;
//! let launch_config = LaunchConfig::from(&config.launch);
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, LaunchSettings, LoggingSettings};
