//! indexbench - time the same player queries with and without index access paths
//!
//! The harness runs a name search and a nation/position join search against
//! PostgreSQL, once with the default planner and once with index scans (and,
//! for the join, hash and merge joins) disabled for that transaction only.

pub mod benchmark;
pub mod cli;
pub mod http_server;
pub mod normalizer;
pub mod observability;
