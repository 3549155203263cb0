//! # HTTP Server
//!
//! The monitor's HTTP surface: event stream, station queries, and status
//! endpoints combined into one router.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use super::events_routes::{events_routes, EventsState};
use super::station_routes::{station_routes, StationState};
use super::status_routes::{health_routes, stats_routes, StatusState};
use crate::hub::EventHub;
use crate::station::StationDirectory;

/// HTTP server for the monitoring facade
pub struct HttpServer {
    config: HttpServerConfig,
    hub: Arc<EventHub>,
    router: Router,
}

impl HttpServer {
    /// Create a server over the given hub and station directory
    pub fn new(
        config: HttpServerConfig,
        hub: Arc<EventHub>,
        directory: Arc<dyn StationDirectory>,
    ) -> Self {
        let router = Self::build_router(&config, Arc::clone(&hub), directory);
        Self {
            config,
            hub,
            router,
        }
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        hub: Arc<EventHub>,
        directory: Arc<dyn StationDirectory>,
    ) -> Router {
        let events_state = EventsState::new(
            Arc::clone(&hub),
            Duration::from_secs(config.keep_alive_secs),
        );
        let station_state = StationState::new(Arc::clone(&directory));
        let status_state = StatusState { hub, directory };

        // Configure CORS from config
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let api = Router::new()
            .merge(events_routes(events_state))
            .merge(station_routes(station_state))
            .merge(stats_routes(status_state));

        let api = if config.prefix.is_empty() {
            api
        } else {
            Router::new().nest(&config.prefix, api)
        };

        Router::new()
            // Health check at root level, outside the prefix
            .merge(health_routes())
            .merge(api)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the server; returns after ctrl-c triggers graceful shutdown
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr_string = self.config.socket_addr();
        let addr: SocketAddr = addr_string.parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", addr_string, e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, prefix = self.config.prefix.as_str(), "monitor listening");

        self.serve_until(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves.
    ///
    /// The hub is shut down as part of the shutdown trigger, before the
    /// graceful drain starts waiting on in-flight responses: an open event
    /// stream only ends once the hub releases its subscriber, so draining
    /// first would wait on it forever.
    pub async fn serve_until<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let hub = Arc::clone(&self.hub);
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                hub.shutdown();
            })
            .await
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for ctrl-c");
    }
}
