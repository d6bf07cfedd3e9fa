//! In-memory session provider
//!
//! Evaluates both operations over fixture tables with the same semantics as
//! the SQL statements (substring ILIKE with LEFT JOIN, equality with INNER
//! JOIN, at most [`RESULT_LIMIT`] rows). Every session is recorded so tests
//! can check which directives ran and that rejected requests never got one.

use std::future::{self, Future};
use std::sync::Mutex;

use serde_json::{json, Value};

use super::errors::{BenchError, BenchResult};
use super::operation::{PlannerMode, ScopedQuery, SearchOperation, RESULT_LIMIT};
use super::session::{SessionProvider, TimedRows};
use crate::normalizer::RawRow;
use crate::observability::Timer;

/// A row of the `players` fixture table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub player_id: i64,
    pub name: String,
    pub nation: String,
    pub team: String,
    pub position: String,
}

impl PlayerRow {
    pub fn new(player_id: i64, name: &str, nation: &str, team: &str, position: &str) -> Self {
        Self {
            player_id,
            name: name.to_string(),
            nation: nation.to_string(),
            team: team.to_string(),
            position: position.to_string(),
        }
    }
}

/// A row of the `player_stats` fixture table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRow {
    pub player_id: i64,
    pub ovr: i64,
    pub pac: i64,
}

impl StatsRow {
    pub fn new(player_id: i64, ovr: i64, pac: i64) -> Self {
        Self {
            player_id,
            ovr,
            pac,
        }
    }
}

/// What one session did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub mode: PlannerMode,
    pub directives: Vec<&'static str>,
    pub statement: &'static str,
    pub params: Vec<String>,
}

/// Session provider over in-memory tables
#[derive(Debug, Default)]
pub struct InMemorySessionProvider {
    players: Vec<PlayerRow>,
    stats: Vec<StatsRow>,
    alias_columns: bool,
    failure: Option<String>,
    sessions: Mutex<Vec<SessionRecord>>,
}

impl InMemorySessionProvider {
    pub fn new(players: Vec<PlayerRow>, stats: Vec<StatsRow>) -> Self {
        Self {
            players,
            stats,
            ..Default::default()
        }
    }

    /// Emit `id`/`club`/`overall`/`pace` instead of the canonical column names
    pub fn with_alias_columns(mut self) -> Self {
        self.alias_columns = true;
        self
    }

    /// Fail every session with `message` after recording it
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Sessions opened so far, oldest first
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.sessions
            .lock()
            .map(|sessions| sessions.clone())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    fn record(&self, query: &ScopedQuery) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(SessionRecord {
                mode: query.mode,
                directives: query.directives().to_vec(),
                statement: query.statement(),
                params: query.params(),
            });
        }
    }

    fn stats_for(&self, player_id: i64) -> Option<&StatsRow> {
        self.stats.iter().find(|s| s.player_id == player_id)
    }

    fn to_raw(&self, player: &PlayerRow, stats: Option<&StatsRow>) -> RawRow {
        let (id, club, overall, pace) = if self.alias_columns {
            ("id", "club", "overall", "pace")
        } else {
            ("player_id", "team", "ovr", "pac")
        };

        let mut row = RawRow::new();
        row.insert(id.to_string(), json!(player.player_id));
        row.insert("name".to_string(), json!(player.name));
        row.insert("nation".to_string(), json!(player.nation));
        row.insert(club.to_string(), json!(player.team));
        row.insert("position".to_string(), json!(player.position));
        row.insert(overall.to_string(), stats.map_or(Value::Null, |s| json!(s.ovr)));
        row.insert(pace.to_string(), stats.map_or(Value::Null, |s| json!(s.pac)));
        row
    }

    fn evaluate(&self, operation: &SearchOperation) -> Vec<RawRow> {
        match operation {
            SearchOperation::NameSearch { name } => {
                let needle = name.to_lowercase();
                self.players
                    .iter()
                    .filter(|p| p.name.to_lowercase().contains(&needle))
                    .take(RESULT_LIMIT)
                    .map(|p| self.to_raw(p, self.stats_for(p.player_id)))
                    .collect()
            }
            SearchOperation::JoinSearch { nation, position } => self
                .players
                .iter()
                .filter(|p| &p.nation == nation && &p.position == position)
                .filter_map(|p| self.stats_for(p.player_id).map(|s| (p, s)))
                .take(RESULT_LIMIT)
                .map(|(p, s)| self.to_raw(p, Some(s)))
                .collect(),
        }
    }

    fn run(&self, query: &ScopedQuery) -> BenchResult<TimedRows> {
        self.record(query);

        if let Some(message) = &self.failure {
            return Err(BenchError::Query(message.clone()));
        }

        let timer = Timer::start();
        let rows = self.evaluate(&query.operation);
        Ok(TimedRows {
            rows,
            elapsed: timer.elapsed(),
        })
    }
}

impl SessionProvider for InMemorySessionProvider {
    fn execute(&self, query: &ScopedQuery) -> impl Future<Output = BenchResult<TimedRows>> + Send {
        future::ready(self.run(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> InMemorySessionProvider {
        InMemorySessionProvider::new(
            vec![
                PlayerRow::new(1, "Lionel Messi", "Argentina", "Inter Miami", "RW"),
                PlayerRow::new(2, "Lautaro Martínez", "Argentina", "Inter", "ST"),
                PlayerRow::new(3, "Julián Álvarez", "Argentina", "Atlético de Madrid", "ST"),
                PlayerRow::new(4, "Messias", "Brazil", "Genoa", "RM"),
            ],
            vec![StatsRow::new(1, 86, 80), StatsRow::new(2, 88, 84)],
        )
    }

    fn name_query(name: &str, mode: PlannerMode) -> ScopedQuery {
        ScopedQuery::new(SearchOperation::name_search(Some(name)).unwrap(), mode)
    }

    #[test]
    fn test_name_search_is_case_insensitive_left_join() {
        let result = provider().run(&name_query("MESSI", PlannerMode::Default)).unwrap();
        assert_eq!(result.rows.len(), 2);

        let messias = result.rows.iter().find(|r| r["player_id"] == 4).unwrap();
        assert!(messias["ovr"].is_null());
    }

    #[test]
    fn test_join_search_is_inner() {
        let query = ScopedQuery::new(
            SearchOperation::join_search(Some("Argentina"), Some("ST")).unwrap(),
            PlannerMode::ForcedNaive,
        );
        let result = provider().run(&query).unwrap();

        // Álvarez has no stats row
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["player_id"], 2);
    }

    #[test]
    fn test_result_limit() {
        let players = (0..20)
            .map(|i| PlayerRow::new(i, &format!("Player {}", i), "X", "Y", "CB"))
            .collect();
        let provider = InMemorySessionProvider::new(players, Vec::new());
        let result = provider.run(&name_query("player", PlannerMode::Default)).unwrap();
        assert_eq!(result.rows.len(), RESULT_LIMIT);
    }

    #[test]
    fn test_sessions_are_recorded() {
        let provider = provider();
        provider.run(&name_query("a", PlannerMode::ForcedNaive)).unwrap();
        provider.run(&name_query("a", PlannerMode::Default)).unwrap();

        let sessions = provider.sessions();
        assert_eq!(sessions.len(), 2);
        assert!(!sessions[0].directives.is_empty());
        assert!(sessions[1].directives.is_empty());
        assert_eq!(sessions[0].params, vec!["%a%".to_string()]);
    }

    #[test]
    fn test_alias_columns() {
        let provider = provider().with_alias_columns();
        let result = provider.run(&name_query("Lautaro", PlannerMode::Default)).unwrap();
        let row = &result.rows[0];
        assert_eq!(row["id"], 2);
        assert_eq!(row["club"], "Inter");
        assert!(row.get("player_id").is_none());
    }

    #[test]
    fn test_failure_injection() {
        let provider = provider().with_failure("connection refused");
        let err = provider.run(&name_query("a", PlannerMode::Default)).unwrap_err();
        assert_eq!(err, BenchError::Query("connection refused".to_string()));
        assert_eq!(provider.session_count(), 1);
    }
}
