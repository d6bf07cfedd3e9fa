use serde::{Deserialize, Serialize};

/// One normalized player row as returned in `results[]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: i64,
    pub name: String,
    pub nation: String,
    pub club: String,
    pub position: String,
    pub overall: i64,
    pub pace: i64,
}
