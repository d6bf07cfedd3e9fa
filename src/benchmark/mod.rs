//! # Benchmark Core
//!
//! Turns a search request into a parameterized statement, forces or leaves
//! the planner alone for that one transaction, and times the execution.
//!
//! - [`SearchOperation`]: validated name search or nation/position join search
//! - [`PlannerMode`]: default planner, or index/hash/merge paths disabled
//! - [`SessionProvider`]: one connection + one transaction per execution
//! - [`QueryExecutor`]: runs, normalizes and reports

pub mod compare;
pub mod config;
pub mod errors;
pub mod executor;
pub mod memory;
pub mod operation;
pub mod postgres;
pub mod session;

pub use compare::{compare_modes, CompareReport, ModeSummary};
pub use config::DatabaseConfig;
pub use errors::{BenchError, BenchResult, ErrorResponse};
pub use executor::{QueryExecutor, QueryResult, SearchResponse};
pub use memory::{InMemorySessionProvider, PlayerRow, SessionRecord, StatsRow};
pub use operation::{OperationKind, PlannerMode, ScopedQuery, SearchOperation, RESULT_LIMIT};
pub use postgres::PgSessionProvider;
pub use session::{SessionProvider, TimedRows};
