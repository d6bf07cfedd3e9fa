//! Benchmark HTTP Routes
//!
//! The same two searches, once per planner mode:
//!
//! - `GET /no-index/search?name=`            forced-naive name search
//! - `GET /with-index/search?name=`          default name search
//! - `GET /no-index/join?nation=&position=`  forced-naive join search
//! - `GET /with-index/join?nation=&position=` default join search

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};

use crate::benchmark::{
    BenchError, BenchResult, PlannerMode, QueryExecutor, SearchOperation, SearchResponse,
    SessionProvider,
};
use crate::observability::{Event, Logger};

// ==================
// Shared State
// ==================

/// State shared by the benchmark handlers
pub struct BenchmarkState<P: SessionProvider> {
    pub executor: QueryExecutor<P>,
}

impl<P: SessionProvider> BenchmarkState<P> {
    pub fn new(executor: QueryExecutor<P>) -> Self {
        Self { executor }
    }
}

type SharedState<P> = Arc<BenchmarkState<P>>;

// ==================
// Request Types
// ==================

/// Raw query pairs, or why the query string could not be read
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Query parameters in request order. Repeated keys keep every value.
#[derive(Debug, Default)]
pub struct SearchParams(Vec<(String, String)>);

impl SearchParams {
    fn from_query(query: QueryPairs) -> BenchResult<Self> {
        query
            .map(|Query(pairs)| SearchParams(pairs))
            .map_err(|e| BenchError::Validation(format!("Invalid query string: {}", e.body_text())))
    }

    /// First value given for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// ==================
// Benchmark Routes
// ==================

/// Create benchmark routes, nested under `/api`
pub fn benchmark_routes<P: SessionProvider>(state: SharedState<P>) -> Router {
    Router::new()
        .route("/no-index/search", get(no_index_search::<P>))
        .route("/with-index/search", get(with_index_search::<P>))
        .route("/no-index/join", get(no_index_join::<P>))
        .route("/with-index/join", get(with_index_join::<P>))
        .with_state(state)
}

async fn no_index_search<P: SessionProvider>(
    State(state): State<SharedState<P>>,
    query: QueryPairs,
) -> BenchResult<Json<SearchResponse>> {
    name_search(&state, query, PlannerMode::ForcedNaive).await
}

async fn with_index_search<P: SessionProvider>(
    State(state): State<SharedState<P>>,
    query: QueryPairs,
) -> BenchResult<Json<SearchResponse>> {
    name_search(&state, query, PlannerMode::Default).await
}

async fn no_index_join<P: SessionProvider>(
    State(state): State<SharedState<P>>,
    query: QueryPairs,
) -> BenchResult<Json<SearchResponse>> {
    join_search(&state, query, PlannerMode::ForcedNaive).await
}

async fn with_index_join<P: SessionProvider>(
    State(state): State<SharedState<P>>,
    query: QueryPairs,
) -> BenchResult<Json<SearchResponse>> {
    join_search(&state, query, PlannerMode::Default).await
}

async fn name_search<P: SessionProvider>(
    state: &BenchmarkState<P>,
    query: QueryPairs,
    mode: PlannerMode,
) -> BenchResult<Json<SearchResponse>> {
    let operation = validated(
        state,
        mode,
        SearchParams::from_query(query)
            .and_then(|params| SearchOperation::name_search(params.first("name"))),
    )?;
    execute(state, operation, mode).await
}

async fn join_search<P: SessionProvider>(
    state: &BenchmarkState<P>,
    query: QueryPairs,
    mode: PlannerMode,
) -> BenchResult<Json<SearchResponse>> {
    let operation = validated(
        state,
        mode,
        SearchParams::from_query(query).and_then(|params| {
            SearchOperation::join_search(params.first("nation"), params.first("position"))
        }),
    )?;
    execute(state, operation, mode).await
}

/// Count and log rejected requests. Nothing reaches the database.
fn validated<P: SessionProvider>(
    state: &BenchmarkState<P>,
    mode: PlannerMode,
    operation: BenchResult<SearchOperation>,
) -> BenchResult<SearchOperation> {
    operation.map_err(|e| {
        state.executor.metrics().record_validation_rejection();
        let reason = e.to_string();
        Logger::warn(
            Event::ValidationRejected.as_str(),
            &[("mode", mode.as_str()), ("reason", reason.as_str())],
        );
        e
    })
}

async fn execute<P: SessionProvider>(
    state: &BenchmarkState<P>,
    operation: SearchOperation,
    mode: PlannerMode,
) -> Result<Json<SearchResponse>, BenchError> {
    let result = state.executor.run(operation, mode).await?;
    Ok(Json(result.into_response()))
}
