//! Metrics registry
//!
//! - Counters only, monotonic, reset on process start
//! - Atomic, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::benchmark::{OperationKind, PlannerMode};

/// Execution counters for one planner mode
#[derive(Debug, Default)]
struct ModeCounters {
    name_searches: AtomicU64,
    join_searches: AtomicU64,
    failures: AtomicU64,
    execution_micros: AtomicU64,
}

impl ModeCounters {
    fn snapshot(&self) -> ModeSnapshot {
        ModeSnapshot {
            name_searches: self.name_searches.load(Ordering::Relaxed),
            join_searches: self.join_searches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            execution_micros: self.execution_micros.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide counters shared by the HTTP handlers and the executor
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    default_mode: ModeCounters,
    forced_naive: ModeCounters,
    validation_rejections: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn mode(&self, mode: PlannerMode) -> &ModeCounters {
        match mode {
            PlannerMode::Default => &self.default_mode,
            PlannerMode::ForcedNaive => &self.forced_naive,
        }
    }

    /// Record a successful execution and its measured time
    pub fn record_execution(&self, kind: OperationKind, mode: PlannerMode, elapsed: Duration) {
        let counters = self.mode(mode);
        match kind {
            OperationKind::NameSearch => counters.name_searches.fetch_add(1, Ordering::Relaxed),
            OperationKind::JoinSearch => counters.join_searches.fetch_add(1, Ordering::Relaxed),
        };
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        counters.execution_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn record_failure(&self, mode: PlannerMode) {
        self.mode(mode).failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_rejection(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            default: self.default_mode.snapshot(),
            forced_naive: self.forced_naive.snapshot(),
            validation_rejections: self.validation_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters for one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeSnapshot {
    pub name_searches: u64,
    pub join_searches: u64,
    pub failures: u64,
    pub execution_micros: u64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub default: ModeSnapshot,
    pub forced_naive: ModeSnapshot,
    pub validation_rejections: u64,
}
