//! CLI module for indexbench
//!
//! Provides command-line interface for:
//! - serve: HTTP benchmark API
//! - compare: repeated runs of one query in both planner modes
//! - check-config: validate and print the configuration

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, CompareTarget};
pub use commands::{check_config, compare, run, run_command, serve};
pub use config::AppConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_response, write_response_to};
