//! Scoped sessions
//!
//! A session is one connection plus one transaction, opened for a single
//! [`ScopedQuery`] and closed before `execute` returns. Planner directives
//! and the timed statement always run inside the same session.

use std::future::Future;
use std::time::Duration;

use super::errors::BenchResult;
use super::operation::ScopedQuery;
use crate::normalizer::RawRow;

/// Raw rows plus the time spent executing the statement itself
#[derive(Debug, Clone, PartialEq)]
pub struct TimedRows {
    pub rows: Vec<RawRow>,
    pub elapsed: Duration,
}

/// Source of scoped sessions.
///
/// Implementations must:
/// - apply `query.directives()` before the statement, in the same transaction
/// - time only the statement execution, not checkout, directives or prepare
/// - close the transaction and release the connection on every exit path
pub trait SessionProvider: Send + Sync + 'static {
    fn execute(&self, query: &ScopedQuery) -> impl Future<Output = BenchResult<TimedRows>> + Send;
}
