//! Per-field lookup rules

use serde_json::Value;
use thiserror::Error;

use super::record::PlayerRecord;
use super::RawRow;

const ID_KEYS: &[&str] = &["player_id", "id"];
const NAME_KEYS: &[&str] = &["name"];
const NATION_KEYS: &[&str] = &["nation"];
const CLUB_KEYS: &[&str] = &["team", "club"];
const POSITION_KEYS: &[&str] = &["position"];
const OVERALL_KEYS: &[&str] = &["ovr", "overall"];
const PACE_KEYS: &[&str] = &["pac", "pace"];

/// Rows that cannot be mapped to a [`PlayerRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("row has no player_id or id column")]
    MissingId,

    #[error("row id is not an integer: {0}")]
    InvalidId(String),
}

/// First candidate key holding a non-null value
fn lookup<'a>(row: &'a RawRow, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(row: &RawRow, keys: &[&str]) -> String {
    match lookup(row, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn integer_field(row: &RawRow, keys: &[&str]) -> i64 {
    lookup(row, keys).and_then(as_integer).unwrap_or(0)
}

fn id_field(row: &RawRow) -> Result<i64, NormalizeError> {
    let value = lookup(row, ID_KEYS).ok_or(NormalizeError::MissingId)?;
    as_integer(value).ok_or_else(|| NormalizeError::InvalidId(value.to_string()))
}

/// Map one raw row to a [`PlayerRecord`].
///
/// Total for every row carrying `player_id` or `id`.
pub fn normalize_row(row: &RawRow) -> Result<PlayerRecord, NormalizeError> {
    Ok(PlayerRecord {
        id: id_field(row)?,
        name: text_field(row, NAME_KEYS),
        nation: text_field(row, NATION_KEYS),
        club: text_field(row, CLUB_KEYS),
        position: text_field(row, POSITION_KEYS),
        overall: integer_field(row, OVERALL_KEYS),
        pace: integer_field(row, PACE_KEYS),
    })
}

/// Map every row, keeping order. Fails on the first unmappable row.
pub fn normalize_rows(rows: &[RawRow]) -> Result<Vec<PlayerRecord>, NormalizeError> {
    rows.iter().map(normalize_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let record = normalize_row(&row(json!({"player_id": 7, "name": "A", "ovr": 88}))).unwrap();
        assert_eq!(
            record,
            PlayerRecord {
                id: 7,
                name: "A".to_string(),
                nation: String::new(),
                club: String::new(),
                position: String::new(),
                overall: 88,
                pace: 0,
            }
        );
    }

    #[test]
    fn test_canonical_columns() {
        let record = normalize_row(&row(json!({
            "player_id": 231747,
            "name": "Kylian Mbappé",
            "nation": "France",
            "team": "Real Madrid",
            "position": "ST",
            "ovr": 91,
            "pac": 97
        })))
        .unwrap();

        assert_eq!(record.id, 231747);
        assert_eq!(record.club, "Real Madrid");
        assert_eq!(record.overall, 91);
        assert_eq!(record.pace, 97);
    }

    #[test]
    fn test_alias_columns() {
        let record = normalize_row(&row(json!({
            "id": 3,
            "name": "B",
            "club": "Arsenal",
            "overall": 80,
            "pace": 71
        })))
        .unwrap();

        assert_eq!(record.id, 3);
        assert_eq!(record.club, "Arsenal");
        assert_eq!(record.overall, 80);
        assert_eq!(record.pace, 71);
    }

    #[test]
    fn test_primary_key_wins_over_alias() {
        let record = normalize_row(&row(json!({
            "player_id": 1,
            "id": 2,
            "team": "Primary",
            "club": "Alias",
            "ovr": 90,
            "overall": 10
        })))
        .unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.club, "Primary");
        assert_eq!(record.overall, 90);
    }

    #[test]
    fn test_null_falls_through() {
        // LEFT JOIN without a stats row
        let record = normalize_row(&row(json!({
            "player_id": 5,
            "team": null,
            "club": "Fallback",
            "ovr": null,
            "pac": null
        })))
        .unwrap();

        assert_eq!(record.club, "Fallback");
        assert_eq!(record.overall, 0);
        assert_eq!(record.pace, 0);
    }

    #[test]
    fn test_loose_numeric_values() {
        let record = normalize_row(&row(json!({
            "player_id": "12",
            "ovr": 77.9,
            "pac": "64"
        })))
        .unwrap();

        assert_eq!(record.id, 12);
        assert_eq!(record.overall, 77);
        assert_eq!(record.pace, 64);
    }

    #[test]
    fn test_unparseable_number_defaults_to_zero() {
        let record = normalize_row(&row(json!({"id": 1, "pac": "fast"}))).unwrap();
        assert_eq!(record.pace, 0);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = normalize_row(&row(json!({"name": "Nobody"}))).unwrap_err();
        assert_eq!(err, NormalizeError::MissingId);

        let err = normalize_row(&row(json!({"player_id": null, "id": null}))).unwrap_err();
        assert_eq!(err, NormalizeError::MissingId);
    }

    #[test]
    fn test_non_integer_id_is_rejected() {
        let err = normalize_row(&row(json!({"player_id": "abc"}))).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidId(_)));
    }

    #[test]
    fn test_normalize_rows_keeps_order() {
        let rows = vec![
            row(json!({"player_id": 2, "name": "second"})),
            row(json!({"player_id": 1, "name": "first"})),
        ];
        let records = normalize_rows(&rows).unwrap();
        assert_eq!(records[0].id, 2);
        assert_eq!(records[1].id, 1);
    }

    #[test]
    fn test_normalize_rows_fails_whole_batch() {
        let rows = vec![row(json!({"player_id": 1})), row(json!({"name": "x"}))];
        assert_eq!(normalize_rows(&rows), Err(NormalizeError::MissingId));
    }
}
