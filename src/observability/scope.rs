//! ObservationScope for begin/complete logging around one unit of work

use std::time::{Duration, Instant};

use super::events::Event;
use super::logger::Logger;

/// The four events one kind of scope logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeEvents {
    pub begin: Event,
    pub complete: Event,
    pub failed: Event,
    pub incomplete: Event,
}

impl ScopeEvents {
    /// One scoped query session
    pub const QUERY: ScopeEvents = ScopeEvents {
        begin: Event::QueryBegin,
        complete: Event::QueryComplete,
        failed: Event::QueryFailed,
        incomplete: Event::QueryIncomplete,
    };
}

/// A scope that logs `begin` on creation and exactly one closing event.
///
/// - `complete_with_fields()` logs `complete` (INFO)
/// - `fail()` logs `failed` (ERROR)
/// - dropping an unclosed scope logs `incomplete` (WARN)
///
/// Fields given at creation are repeated on the closing event so each line
/// can be correlated on its own.
pub struct ObservationScope {
    events: ScopeEvents,
    fields: Vec<(&'static str, String)>,
    closed: bool,
}

impl ObservationScope {
    pub fn new(events: ScopeEvents) -> Self {
        Self::with_fields(events, Vec::new())
    }

    pub fn with_fields(events: ScopeEvents, fields: Vec<(&'static str, String)>) -> Self {
        let scope = Self {
            events,
            fields,
            closed: false,
        };
        Logger::info(events.begin.as_str(), &scope.field_refs(&[]));
        scope
    }

    fn field_refs<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        self.fields
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(extra.iter().copied())
            .collect()
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.closed = true;
        Logger::info(self.events.complete.as_str(), &self.field_refs(extra));
    }

    pub fn fail(mut self, reason: &str) {
        self.closed = true;
        Logger::error(
            self.events.failed.as_str(),
            &self.field_refs(&[("reason", reason)]),
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            Logger::warn(
                self.events.incomplete.as_str(),
                &self.field_refs(&[("reason", "scope dropped without completion")]),
            );
        }
    }
}

/// Wall-clock timer for a single measured interval
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Seconds rounded to 6 decimal places
pub fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_complete() {
        let scope =
            ObservationScope::with_fields(ScopeEvents::QUERY, vec![("mode", "default".to_string())]);
        assert!(!scope.is_closed());
        scope.complete_with_fields(&[("rows", "3")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new(ScopeEvents::QUERY);
        scope.fail("connection refused");
    }

    #[test]
    fn test_scope_drop_without_close() {
        let scope = ObservationScope::new(ScopeEvents::QUERY);
        drop(scope);
    }

    #[test]
    fn test_query_scope_events() {
        assert_eq!(ScopeEvents::QUERY.begin.as_str(), "QUERY_BEGIN");
        assert_eq!(ScopeEvents::QUERY.complete.as_str(), "QUERY_COMPLETE");
        assert_eq!(ScopeEvents::QUERY.failed.as_str(), "QUERY_FAILED");
        assert_eq!(ScopeEvents::QUERY.incomplete.as_str(), "QUERY_INCOMPLETE");
    }

    #[test]
    fn test_timer_measures_sleep() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_round_secs() {
        assert_eq!(round_secs(Duration::from_nanos(1_234_567_890)), 1.234568);
        assert_eq!(round_secs(Duration::from_micros(42)), 0.000042);
        assert_eq!(round_secs(Duration::ZERO), 0.0);
    }
}
