//! # Row Normalizer
//!
//! Maps raw result rows into the fixed [`PlayerRecord`] shape.
//!
//! Source rows may name the same attribute differently (`team` or `club`,
//! `ovr` or `overall`, ...). Every output field is resolved by walking an
//! ordered list of candidate keys; a key that is absent or holds SQL NULL
//! falls through to the next candidate, then to the field's default.

mod record;
mod rules;

pub use record::PlayerRecord;
pub use rules::{normalize_row, normalize_rows, NormalizeError};

/// A raw result row: column name to JSON value
pub type RawRow = serde_json::Map<String, serde_json::Value>;
