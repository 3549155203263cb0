//! HTTP Server Configuration
//!
//! Configuration for the monitoring HTTP server: bind address, API route
//! prefix, CORS, and SSE keep-alive.

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8090)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix the API routes are nested under, e.g. "/manager".
    /// Empty means the routes sit at the root. `/health` is always at
    /// the root regardless.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// CORS allowed origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Seconds of idle time before a keep-alive comment is written to an
    /// open event stream (default: 5)
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_prefix() -> String {
    String::new()
}

fn default_keep_alive_secs() -> u64 {
    5
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            prefix: default_prefix(),
            cors_origins: Vec::new(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl HttpServerConfig {
    /// Create a config with the given port and defaults otherwise
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the config for values the server cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("http.port must not be 0".to_string());
        }
        if !self.prefix.is_empty() {
            if !self.prefix.starts_with('/') {
                return Err("http.prefix must start with '/'".to_string());
            }
            if self.prefix.ends_with('/') {
                return Err("http.prefix must not end with '/'".to_string());
            }
        }
        if self.keep_alive_secs == 0 {
            return Err("http.keep_alive_secs must be at least 1".to_string());
        }
        Ok(())
    }
}
