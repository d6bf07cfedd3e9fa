//! Observability for indexbench
//!
//! - Structured logging (JSON lines)
//! - Monotonic counters exposed over HTTP
//! - Begin/complete scopes around query executions
//!
//! ```ignore
//! use indexbench::observability::{Logger, ObservationScope, ScopeEvents};
//!
//! Logger::info("SERVER_START", &[("addr", "0.0.0.0:5001")]);
//!
//! let scope = ObservationScope::new(ScopeEvents::QUERY);
//! // ... execute ...
//! scope.complete_with_fields(&[("rows", "5")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot, ModeSnapshot};
pub use scope::{round_secs, ObservationScope, ScopeEvents, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    if event.is_fatal() {
        Logger::fatal(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}
