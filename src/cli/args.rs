//! CLI argument definitions using clap
//!
//! Commands:
//! - ocppwatch init --config <path>
//! - ocppwatch serve --config <path> [--port <port>] [--demo]
//! - ocppwatch operations

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ocppwatch - Read-only monitoring facade for an OCPP 1.6 central system
#[derive(Parser, Debug)]
#[command(name = "ocppwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./ocppwatch.json")]
        config: PathBuf,
    },

    /// Start the monitoring HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./ocppwatch.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Publish simulated charge point traffic into the hub
        #[arg(long)]
        demo: bool,
    },

    /// Print the OCPP 1.6 operation table as JSON
    Operations,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
