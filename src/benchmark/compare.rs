//! Side-by-side runs of one operation in both planner modes

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use super::errors::{BenchError, BenchResult};
use super::executor::QueryExecutor;
use super::operation::{OperationKind, PlannerMode, SearchOperation};
use super::session::SessionProvider;
use crate::normalizer::PlayerRecord;
use crate::observability::round_secs;

/// Timing summary for one mode, in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSummary {
    pub mode: PlannerMode,
    pub runs: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub count: usize,
}

impl ModeSummary {
    fn from_timings(mode: PlannerMode, timings: &[Duration], count: usize) -> Self {
        let total: Duration = timings.iter().sum();
        let mean = if timings.is_empty() {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(total.as_secs_f64() / timings.len() as f64)
        };

        Self {
            mode,
            runs: timings.len(),
            min: round_secs(timings.iter().min().copied().unwrap_or_default()),
            mean: round_secs(mean),
            max: round_secs(timings.iter().max().copied().unwrap_or_default()),
            count,
        }
    }
}

/// Result of running one operation `runs` times per mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareReport {
    pub operation: OperationKind,
    pub modes: Vec<ModeSummary>,
    /// Every run in every mode returned the same record set
    pub results_match: bool,
    /// Forced-naive mean divided by default mean; absent when the default mean rounds to zero
    pub naive_to_default_ratio: Option<f64>,
}

impl CompareReport {
    pub fn summary(&self, mode: PlannerMode) -> Option<&ModeSummary> {
        self.modes.iter().find(|s| s.mode == mode)
    }
}

/// Run `operation` `runs` times in each mode, forced-naive first.
///
/// Record sets are compared as sets; row order is not stable without ORDER BY.
pub async fn compare_modes<P: SessionProvider>(
    executor: &QueryExecutor<P>,
    operation: &SearchOperation,
    runs: usize,
) -> BenchResult<CompareReport> {
    if runs == 0 {
        return Err(BenchError::Validation("runs must be > 0".to_string()));
    }

    let mut modes = Vec::with_capacity(PlannerMode::ALL.len());
    let mut reference: Option<HashSet<PlayerRecord>> = None;
    let mut results_match = true;

    for mode in PlannerMode::ALL {
        let mut timings = Vec::with_capacity(runs);
        let mut count = 0;

        for _ in 0..runs {
            let result = executor.run(operation.clone(), mode).await?;
            timings.push(result.elapsed);
            count = result.result_count();

            let records: HashSet<PlayerRecord> = result.records.into_iter().collect();
            match &reference {
                Some(expected) => results_match &= *expected == records,
                None => reference = Some(records),
            }
        }

        modes.push(ModeSummary::from_timings(mode, &timings, count));
    }

    let mean = |mode: PlannerMode| {
        modes
            .iter()
            .find(|s| s.mode == mode)
            .map_or(0.0, |s| s.mean)
    };
    let default_mean = mean(PlannerMode::Default);
    let naive_to_default_ratio = if default_mean > 0.0 {
        Some(mean(PlannerMode::ForcedNaive) / default_mean)
    } else {
        None
    };

    Ok(CompareReport {
        operation: operation.kind(),
        modes,
        results_match,
        naive_to_default_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::benchmark::memory::{InMemorySessionProvider, PlayerRow, StatsRow};
    use crate::observability::MetricsRegistry;

    fn executor() -> QueryExecutor<InMemorySessionProvider> {
        let provider = InMemorySessionProvider::new(
            vec![
                PlayerRow::new(1, "Pedri", "Spain", "FC Barcelona", "CM"),
                PlayerRow::new(2, "Rodri", "Spain", "Manchester City", "CDM"),
                PlayerRow::new(3, "Fabián Ruiz", "Spain", "Paris SG", "CM"),
            ],
            vec![StatsRow::new(1, 87, 76), StatsRow::new(3, 84, 68)],
        );
        QueryExecutor::new(Arc::new(provider), Arc::new(MetricsRegistry::new()))
    }

    #[test]
    fn test_summary_from_timings() {
        let summary = ModeSummary::from_timings(
            PlannerMode::Default,
            &[
                Duration::from_micros(100),
                Duration::from_micros(300),
                Duration::from_micros(200),
            ],
            2,
        );
        assert_eq!(summary.runs, 3);
        assert_eq!(summary.min, 0.0001);
        assert_eq!(summary.mean, 0.0002);
        assert_eq!(summary.max, 0.0003);
    }

    #[test]
    fn test_summary_without_timings() {
        let summary = ModeSummary::from_timings(PlannerMode::Default, &[], 0);
        assert_eq!(summary.runs, 0);
        assert_eq!(summary.mean, 0.0);
    }

    #[tokio::test]
    async fn test_compare_runs_both_modes() {
        let executor = executor();
        let operation = SearchOperation::join_search(Some("Spain"), Some("CM")).unwrap();

        let report = compare_modes(&executor, &operation, 3).await.unwrap();

        assert_eq!(report.operation, OperationKind::JoinSearch);
        assert!(report.results_match);
        assert_eq!(report.summary(PlannerMode::ForcedNaive).unwrap().count, 2);
        assert_eq!(report.summary(PlannerMode::Default).unwrap().runs, 3);
        assert_eq!(executor.provider().session_count(), 6);

        let sessions = executor.provider().sessions();
        assert!(sessions[..3].iter().all(|s| !s.directives.is_empty()));
        assert!(sessions[3..].iter().all(|s| s.directives.is_empty()));
    }

    #[tokio::test]
    async fn test_zero_runs_rejected() {
        let operation = SearchOperation::name_search(Some("pedri")).unwrap();
        let err = compare_modes(&executor(), &operation, 0).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
