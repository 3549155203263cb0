//! CLI module for ocppwatch
//!
//! Provides command-line interface for:
//! - init: Write a default configuration file
//! - serve: Run the monitoring HTTP server
//! - operations: Print the OCPP 1.6 operation table

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, operations, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_json, write_response};
