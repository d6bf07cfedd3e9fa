//! # HTTP Server Module
//!
//! Axum server exposing the benchmark API.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/{no-index,with-index}/{search,join}` - Timed searches
//! - `/observability/*` - Health and counters

pub mod benchmark_routes;
pub mod config;
pub mod observability_routes;
pub mod server;

pub use benchmark_routes::BenchmarkState;
pub use config::HttpServerConfig;
pub use server::HttpServer;
