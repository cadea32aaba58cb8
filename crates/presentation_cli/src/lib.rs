//! Command-line presentation layer
//!
//! Parses arguments, runs one subcommand and maps its outcome to the
//! process exit status: 0 success, 2 configuration, 3 to 7 pipeline failures.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, log_filter_from_verbosity};
pub use commands::{EXIT_CONFIG, execute};
