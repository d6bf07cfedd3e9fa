//! Observable events
//!
//! Every log line the harness emits names one of these events.

use std::fmt;

/// Observable events in indexbench
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Connection pool created
    PoolCreated,
    /// HTTP listener bound, serving
    ServerStart,
    /// HTTP server exited
    ServerStop,
    /// Startup failed (FATAL)
    StartupFailed,

    // Requests
    /// Request rejected before any database work
    ValidationRejected,

    // Query sessions
    /// Scoped session about to run
    QueryBegin,
    /// Rows returned and normalized
    QueryComplete,
    /// Session or normalization failed
    QueryFailed,
    /// Query scope dropped without an outcome
    QueryIncomplete,
    /// One planner directive applied (TRACE)
    PlannerDirective,

    // Compare runs
    /// A CLI compare run finished
    CompareComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::PoolCreated => "POOL_CREATED",
            Event::ServerStart => "SERVER_START",
            Event::ServerStop => "SERVER_STOP",
            Event::StartupFailed => "STARTUP_FAILED",
            Event::ValidationRejected => "VALIDATION_REJECTED",
            Event::QueryBegin => "QUERY_BEGIN",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryFailed => "QUERY_FAILED",
            Event::QueryIncomplete => "QUERY_INCOMPLETE",
            Event::PlannerDirective => "PLANNER_DIRECTIVE",
            Event::CompareComplete => "COMPARE_COMPLETE",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StartupFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
