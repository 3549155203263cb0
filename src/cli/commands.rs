//! CLI command implementations
//!
//! `init` writes a default configuration file, `serve` runs the monitoring
//! HTTP server until ctrl-c, `operations` prints the OCPP operation table.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::demo;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::hub::{EventHub, HubConfig};
use crate::ocpp::{EventRecorder, OPERATIONS};
use crate::station::MemoryDirectory;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_json, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Event hub settings
    #[serde(default)]
    pub hub: HubConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        self.http.validate().map_err(CliError::config_error)?;

        if self.hub.retained_events == 0 {
            return Err(CliError::config_error("hub.retained_events must be > 0"));
        }
        if self.hub.subscriber_queue == 0 {
            return Err(CliError::config_error("hub.subscriber_queue must be > 0"));
        }

        Ok(())
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port, demo } => serve(&config, port, demo),
        Command::Operations => operations(),
    }
}

/// Write a default configuration file
///
/// Refuses to overwrite an existing file.
pub fn init(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::already_initialized(config_path.display()));
    }

    let content = format!("{}\n", serde_json::to_string_pretty(&Config::default())?);
    fs::write(config_path, content)
        .map_err(|e| CliError::io_error(format!("Failed to write config: {}", e)))?;

    write_response(json!({
        "initialized": true,
        "path": config_path.display().to_string(),
    }))?;

    Ok(())
}

/// Run the monitoring HTTP server until ctrl-c
///
/// Builds the event hub, the station directory, and the HTTP server from
/// the configuration file, then blocks on the async runtime. With `--demo`
/// a background task feeds the hub with synthetic charge point traffic.
pub fn serve(config_path: &Path, port: Option<u16>, demo: bool) -> CliResult<()> {
    if !config_path.exists() {
        return Err(CliError::config_error(format!(
            "Configuration file not found: {}. Run 'ocppwatch init' first.",
            config_path.display()
        )));
    }

    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    init_tracing();
    tracing::info!(config = %config_path.display(), demo, "ocppwatch starting");

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::server_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let hub = Arc::new(EventHub::new(config.hub.clone()));
        let directory = Arc::new(MemoryDirectory::new());

        if demo {
            let recorder = EventRecorder::new(Arc::clone(&hub));
            demo::spawn_feed(recorder, Arc::clone(&directory));
        }

        let server = HttpServer::new(config.http.clone(), hub, directory);

        server
            .start()
            .await
            .map_err(|e| CliError::server_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Print the OCPP 1.6 operation table as JSON
pub fn operations() -> CliResult<()> {
    let listing = serde_json::to_string_pretty(&OPERATIONS)?;
    write_json(&listing)?;

    Ok(())
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocppwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
