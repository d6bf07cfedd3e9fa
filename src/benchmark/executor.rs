//! # Query Executor
//!
//! Runs one validated operation under one planner mode through a
//! [`SessionProvider`], normalizes the rows and reports the timing.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use super::errors::BenchResult;
use super::operation::{PlannerMode, ScopedQuery, SearchOperation};
use super::session::SessionProvider;
use crate::normalizer::{normalize_rows, PlayerRecord};
use crate::observability::{round_secs, MetricsRegistry, ObservationScope, ScopeEvents};

/// Outcome of one execution. Lives for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub elapsed: Duration,
    pub records: Vec<PlayerRecord>,
}

impl QueryResult {
    pub fn result_count(&self) -> usize {
        self.records.len()
    }

    /// Seconds, rounded to 6 decimal places
    pub fn execution_time(&self) -> f64 {
        round_secs(self.elapsed)
    }

    pub fn into_response(self) -> SearchResponse {
        SearchResponse {
            execution_time: self.execution_time(),
            count: self.result_count(),
            results: self.records,
        }
    }
}

/// Success body of every search endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub execution_time: f64,
    pub results: Vec<PlayerRecord>,
    pub count: usize,
}

/// Executes search operations. Holds no per-request state.
pub struct QueryExecutor<P: SessionProvider> {
    provider: Arc<P>,
    metrics: Arc<MetricsRegistry>,
}

impl<P: SessionProvider> Clone for QueryExecutor<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<P: SessionProvider> QueryExecutor<P> {
    pub fn new(provider: Arc<P>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { provider, metrics }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Execute `operation` in `mode`.
    ///
    /// Either every row is normalized and returned, or an error is.
    pub async fn run(&self, operation: SearchOperation, mode: PlannerMode) -> BenchResult<QueryResult> {
        let kind = operation.kind();
        let scope = ObservationScope::with_fields(
            ScopeEvents::QUERY,
            vec![
                ("request_id", Uuid::new_v4().to_string()),
                ("operation", kind.as_str().to_string()),
                ("mode", mode.as_str().to_string()),
            ],
        );

        let query = ScopedQuery::new(operation, mode);
        let outcome = match self.provider.execute(&query).await {
            Ok(timed) => normalize_rows(&timed.rows)
                .map(|records| QueryResult {
                    elapsed: timed.elapsed,
                    records,
                })
                .map_err(Into::into),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                self.metrics.record_execution(kind, mode, result.elapsed);
                let rows = result.result_count().to_string();
                let seconds = result.execution_time().to_string();
                scope.complete_with_fields(&[
                    ("rows", rows.as_str()),
                    ("execution_time", seconds.as_str()),
                ]);
                Ok(result)
            }
            Err(e) => {
                self.metrics.record_failure(mode);
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::errors::BenchError;
    use crate::benchmark::memory::{InMemorySessionProvider, PlayerRow, StatsRow};

    fn executor(provider: InMemorySessionProvider) -> QueryExecutor<InMemorySessionProvider> {
        QueryExecutor::new(Arc::new(provider), Arc::new(MetricsRegistry::new()))
    }

    fn fixture() -> InMemorySessionProvider {
        InMemorySessionProvider::new(
            vec![
                PlayerRow::new(10, "Kevin De Bruyne", "Belgium", "Napoli", "CM"),
                PlayerRow::new(11, "Jérémy Doku", "Belgium", "Manchester City", "LW"),
            ],
            vec![StatsRow::new(10, 89, 67)],
        )
    }

    #[test]
    fn test_query_result_response() {
        let result = QueryResult {
            elapsed: Duration::from_nanos(1_500_000),
            records: Vec::new(),
        };
        let response = result.into_response();
        assert_eq!(response.execution_time, 0.0015);
        assert_eq!(response.count, 0);
    }

    #[tokio::test]
    async fn test_run_normalizes_rows() {
        let executor = executor(fixture());
        let result = executor
            .run(
                SearchOperation::name_search(Some("bruyne")).unwrap(),
                PlannerMode::ForcedNaive,
            )
            .await
            .unwrap();

        assert_eq!(result.result_count(), 1);
        assert_eq!(result.records[0].club, "Napoli");
        assert_eq!(result.records[0].overall, 89);
        assert_eq!(executor.metrics().snapshot().forced_naive.name_searches, 1);
    }

    #[tokio::test]
    async fn test_left_join_without_stats_defaults() {
        let executor = executor(fixture());
        let result = executor
            .run(SearchOperation::name_search(Some("doku")).unwrap(), PlannerMode::Default)
            .await
            .unwrap();

        assert_eq!(result.records[0].overall, 0);
        assert_eq!(result.records[0].pace, 0);
    }

    #[tokio::test]
    async fn test_failure_is_counted() {
        let executor = executor(fixture().with_failure("server closed the connection"));
        let err = executor
            .run(
                SearchOperation::join_search(Some("Belgium"), Some("CM")).unwrap(),
                PlannerMode::Default,
            )
            .await
            .unwrap_err();

        assert_eq!(err, BenchError::Query("server closed the connection".to_string()));
        assert_eq!(executor.metrics().snapshot().default.failures, 1);
    }
}
