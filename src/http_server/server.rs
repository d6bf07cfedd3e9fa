//! # HTTP Server
//!
//! Combines the health, observability and benchmark routers behind one
//! CORS layer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::benchmark_routes::{benchmark_routes, BenchmarkState};
use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, observability_routes};
use crate::benchmark::{QueryExecutor, SessionProvider};
use crate::observability::{log_event, log_event_with_fields, Event};

/// HTTP server for the benchmark API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server serving `executor` with `config`
    pub fn new<P: SessionProvider>(config: HttpServerConfig, executor: QueryExecutor<P>) -> Self {
        let router = Self::build_router(&config, executor);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router<P: SessionProvider>(
        config: &HttpServerConfig,
        executor: QueryExecutor<P>,
    ) -> Router {
        let metrics = Arc::clone(executor.metrics());
        let benchmark_state = Arc::new(BenchmarkState::new(executor));

        Router::new()
            .merge(health_routes())
            .nest("/observability", observability_routes(metrics))
            .nest("/api", benchmark_routes(benchmark_state))
            .layer(Self::cors_layer(config))
    }

    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if config.cors_origins.is_empty() {
            layer.allow_origin(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the listener fails
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerStart, &[("addr", bound.as_str())]);

        let served = axum::serve(listener, self.router).await;
        log_event(Event::ServerStop);
        served
    }
}
