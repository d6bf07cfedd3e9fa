//! Search operations, planner modes and the statements they compile to.

use std::fmt;

use serde::Serialize;

use super::errors::{BenchError, BenchResult};

/// Maximum rows any operation returns
pub const RESULT_LIMIT: usize = 5;

const NAME_SEARCH_SQL: &str = "SELECT p.player_id, p.name, p.nation, p.team, p.position, ps.ovr, ps.pac \
     FROM players p \
     LEFT JOIN player_stats ps ON p.player_id = ps.player_id \
     WHERE p.name ILIKE $1 \
     LIMIT 5";

const JOIN_SEARCH_SQL: &str = "SELECT p.player_id, p.name, p.nation, p.team, p.position, ps.ovr, ps.pac \
     FROM players p \
     JOIN player_stats ps ON p.player_id = ps.player_id \
     WHERE p.nation = $1 AND p.position = $2 \
     LIMIT 5";

/// Disable every index-driven scan path
const SCAN_DIRECTIVES: &[&str] = &[
    "SET LOCAL enable_indexscan = off",
    "SET LOCAL enable_indexonlyscan = off",
    "SET LOCAL enable_bitmapscan = off",
];

/// Scan directives plus hash and merge joins off, leaving nested loops
const JOIN_DIRECTIVES: &[&str] = &[
    "SET LOCAL enable_indexscan = off",
    "SET LOCAL enable_indexonlyscan = off",
    "SET LOCAL enable_bitmapscan = off",
    "SET LOCAL enable_hashjoin = off",
    "SET LOCAL enable_mergejoin = off",
];

/// Which statement shape an operation uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    NameSearch,
    JoinSearch,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::NameSearch => "name_search",
            OperationKind::JoinSearch => "join_search",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Planner behavior for one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerMode {
    /// Planner picks any access path (`/api/with-index/*`)
    Default,
    /// Index scans, and for joins hash/merge joins, disabled for the transaction (`/api/no-index/*`)
    ForcedNaive,
}

impl PlannerMode {
    pub const ALL: [PlannerMode; 2] = [PlannerMode::ForcedNaive, PlannerMode::Default];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlannerMode::Default => "default",
            PlannerMode::ForcedNaive => "forced_naive",
        }
    }
}

impl fmt::Display for PlannerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOperation {
    /// Case-insensitive substring match on player name, stats left-joined
    NameSearch { name: String },
    /// Exact nation and position match, stats inner-joined
    JoinSearch { nation: String, position: String },
}

fn present(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl SearchOperation {
    /// Validate a name search. Missing or empty `name` is rejected.
    pub fn name_search(name: Option<&str>) -> BenchResult<Self> {
        let name = present(name).ok_or_else(|| BenchError::missing_param("name"))?;
        Ok(SearchOperation::NameSearch { name })
    }

    /// Validate a join search. Either value missing or empty is rejected.
    pub fn join_search(nation: Option<&str>, position: Option<&str>) -> BenchResult<Self> {
        match (present(nation), present(position)) {
            (Some(nation), Some(position)) => Ok(SearchOperation::JoinSearch { nation, position }),
            _ => Err(BenchError::missing_params()),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            SearchOperation::NameSearch { .. } => OperationKind::NameSearch,
            SearchOperation::JoinSearch { .. } => OperationKind::JoinSearch,
        }
    }

    /// Parameterized statement text
    pub fn statement(&self) -> &'static str {
        match self.kind() {
            OperationKind::NameSearch => NAME_SEARCH_SQL,
            OperationKind::JoinSearch => JOIN_SEARCH_SQL,
        }
    }

    /// Bind values for `$1`, `$2`, in order
    pub fn params(&self) -> Vec<String> {
        match self {
            SearchOperation::NameSearch { name } => vec![format!("%{}%", escape_like(name))],
            SearchOperation::JoinSearch { nation, position } => {
                vec![nation.clone(), position.clone()]
            }
        }
    }

    /// Planner directives for `mode`. Fixed literals, never built from input.
    pub fn directives(&self, mode: PlannerMode) -> &'static [&'static str] {
        match (mode, self.kind()) {
            (PlannerMode::Default, _) => &[],
            (PlannerMode::ForcedNaive, OperationKind::NameSearch) => SCAN_DIRECTIVES,
            (PlannerMode::ForcedNaive, OperationKind::JoinSearch) => JOIN_DIRECTIVES,
        }
    }
}

/// Escape LIKE metacharacters so the input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Everything one scoped session needs: what to run and under which mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedQuery {
    pub operation: SearchOperation,
    pub mode: PlannerMode,
}

impl ScopedQuery {
    pub fn new(operation: SearchOperation, mode: PlannerMode) -> Self {
        Self { operation, mode }
    }

    pub fn directives(&self) -> &'static [&'static str] {
        self.operation.directives(self.mode)
    }

    pub fn statement(&self) -> &'static str {
        self.operation.statement()
    }

    pub fn params(&self) -> Vec<String> {
        self.operation.params()
    }
}
