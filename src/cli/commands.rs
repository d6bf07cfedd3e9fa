//! CLI command implementations
//!
//! Each command loads the configuration exactly once, applies the log level,
//! and only then builds the runtime, pool and server it needs.

use std::path::Path;
use std::sync::Arc;

use super::args::{Command, CompareTarget};
use super::config::AppConfig;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::benchmark::{compare_modes, PgSessionProvider, QueryExecutor, SearchOperation};
use crate::http_server::HttpServer;
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};

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
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Compare {
            config,
            runs,
            target,
        } => compare(config.as_deref(), runs, target),
        Command::CheckConfig { config } => check_config(config.as_deref()),
    }
}

/// Load configuration and apply its log level
fn load_config(config_path: Option<&Path>) -> CliResult<AppConfig> {
    let config = AppConfig::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    log_event_with_fields(Event::ConfigLoaded, &[("source", source.as_str())]);

    Ok(config)
}

fn build_executor(config: &AppConfig) -> CliResult<QueryExecutor<PgSessionProvider>> {
    let provider = PgSessionProvider::connect(&config.database)
        .map_err(|e| CliError::startup_failed(e.to_string()))?;

    let pool_size = config.database.pool_size.to_string();
    log_event_with_fields(
        Event::PoolCreated,
        &[
            ("host", config.database.host.as_str()),
            ("dbname", config.database.dbname.as_str()),
            ("pool_size", pool_size.as_str()),
        ],
    );

    Ok(QueryExecutor::new(
        Arc::new(provider),
        Arc::new(MetricsRegistry::new()),
    ))
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::startup_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Start the HTTP server
///
/// 1. Load configuration
/// 2. Create the connection pool (connections open lazily)
/// 3. Bind and serve until the listener fails
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let rt = runtime()?;
    let result = rt.block_on(async {
        let executor = build_executor(&config)?;
        HttpServer::new(config.server.clone(), executor)
            .start()
            .await
            .map_err(|e| CliError::startup_failed(format!("HTTP server failed: {}", e)))
    });

    if let Err(e) = &result {
        log_event_with_fields(Event::StartupFailed, &[("reason", e.message())]);
    }
    result
}

/// Run one operation in both planner modes and print a timing report
pub fn compare(config_path: Option<&Path>, runs: u32, target: CompareTarget) -> CliResult<()> {
    let config = load_config(config_path)?;

    let operation = match &target {
        CompareTarget::Search { name } => SearchOperation::name_search(Some(name.as_str())),
        CompareTarget::Join { nation, position } => {
            SearchOperation::join_search(Some(nation.as_str()), Some(position.as_str()))
        }
    }?;

    let rt = runtime()?;
    let report = rt.block_on(async {
        let executor = build_executor(&config)?;
        compare_modes(&executor, &operation, runs as usize)
            .await
            .map_err(CliError::from)
    })?;

    let matched = report.results_match.to_string();
    log_event_with_fields(
        Event::CompareComplete,
        &[
            ("operation", report.operation.as_str()),
            ("results_match", matched.as_str()),
        ],
    );

    write_response(&report)
}

/// Validate configuration and print the effective values
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    write_response(&config.redacted())
}
