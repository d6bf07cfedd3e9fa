//! PostgreSQL session provider backed by a deadpool connection pool

use std::error::Error;

use deadpool_postgres::{Pool, Runtime};
use serde_json::{Map, Number, Value};
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};

use super::config::DatabaseConfig;
use super::errors::{BenchError, BenchResult};
use super::operation::ScopedQuery;
use super::session::{SessionProvider, TimedRows};
use crate::normalizer::RawRow;
use crate::observability::{Event, Logger, Timer};

/// Sessions on pooled PostgreSQL connections.
///
/// Each `execute` checks out one client, opens a transaction, applies the
/// `SET LOCAL` directives, runs the prepared statement and commits. On any
/// error the transaction is dropped, which rolls it back before the client
/// is recycled, so directives never outlive the request.
#[derive(Clone)]
pub struct PgSessionProvider {
    pool: Pool,
}

impl PgSessionProvider {
    /// Build the pool. No connection is opened until the first checkout.
    pub fn connect(config: &DatabaseConfig) -> BenchResult<Self> {
        let pool = config
            .to_pool_config()
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| BenchError::Query(format!("Failed to create database pool: {}", e)))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn run(&self, query: &ScopedQuery) -> BenchResult<TimedRows> {
        let mut object = self.pool.get().await?;
        let client: &mut Client = &mut object;
        let tx = client.transaction().await?;

        for directive in query.directives() {
            Logger::trace(Event::PlannerDirective.as_str(), &[("sql", directive)]);
            tx.batch_execute(directive).await?;
        }

        let statement = tx.prepare(query.statement()).await?;
        let values = query.params();
        let params: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        let timer = Timer::start();
        let rows = tx.query(&statement, &params).await?;
        let elapsed = timer.elapsed();

        tx.commit().await?;

        let rows = rows.iter().map(row_to_map).collect::<BenchResult<Vec<_>>>()?;
        Ok(TimedRows { rows, elapsed })
    }
}

impl SessionProvider for PgSessionProvider {
    async fn execute(&self, query: &ScopedQuery) -> BenchResult<TimedRows> {
        self.run(query).await
    }
}

/// Convert a driver row into a column-name keyed map
fn row_to_map(row: &Row) -> BenchResult<RawRow> {
    let mut map = Map::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), column_value(row, idx, column.type_())?);
    }
    Ok(map)
}

fn column_value(row: &Row, idx: usize, ty: &Type) -> BenchResult<Value> {
    let value = match *ty {
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(Value::from),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(Value::from),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::from),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .and_then(|f| Number::from_f64(f64::from(f)))
            .map(Value::Number),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        Type::NUMERIC => row
            .try_get::<_, Option<NumericText>>(idx)?
            .map(|n| n.into_value()),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx)?.map(Value::String)
        }
        ref other => {
            return Err(BenchError::Query(format!(
                "unsupported column type {} for column {}",
                other,
                row.columns()[idx].name()
            )))
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_POS_INF: u16 = 0xD000;
const NUMERIC_NEG_INF: u16 = 0xF000;
const NUMERIC_NEG: u16 = 0x4000;

/// A NUMERIC column rendered as its decimal text
#[derive(Debug, Clone, PartialEq, Eq)]
struct NumericText(String);

impl NumericText {
    /// Integers and finite decimals become JSON numbers, anything else stays text
    fn into_value(self) -> Value {
        if let Ok(i) = self.0.parse::<i64>() {
            return Value::from(i);
        }
        self.0
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64)
            .map_or(Value::String(self.0), Value::Number)
    }
}

fn read_u16(raw: &[u8], offset: usize) -> Result<u16, Box<dyn Error + Sync + Send>> {
    raw.get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| "truncated NUMERIC value".into())
}

impl<'a> FromSql<'a> for NumericText {
    /// Binary layout: ndigits, weight, sign, dscale (all 16-bit), then
    /// `ndigits` base-10000 digits, most significant first
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let ndigits = usize::from(read_u16(raw, 0)?);
        let weight = i32::from(read_u16(raw, 2)? as i16);
        let sign = read_u16(raw, 4)?;
        let dscale = usize::from(read_u16(raw, 6)?);

        match sign {
            NUMERIC_NAN => return Ok(NumericText("NaN".to_string())),
            NUMERIC_POS_INF => return Ok(NumericText("Infinity".to_string())),
            NUMERIC_NEG_INF => return Ok(NumericText("-Infinity".to_string())),
            _ => {}
        }

        let mut digits = Vec::with_capacity(ndigits);
        for i in 0..ndigits {
            digits.push(read_u16(raw, 8 + i * 2)?);
        }
        let digit = |group: i32| -> u16 {
            usize::try_from(group)
                .ok()
                .and_then(|g| digits.get(g).copied())
                .unwrap_or(0)
        };

        let mut text = String::new();
        if sign == NUMERIC_NEG {
            text.push('-');
        }

        if weight < 0 {
            text.push('0');
        } else {
            text.push_str(&digit(0).to_string());
            for group in 1..=weight {
                text.push_str(&format!("{:04}", digit(group)));
            }
        }

        if dscale > 0 {
            let mut fraction = String::with_capacity(dscale + 4);
            let mut group = weight + 1;
            while fraction.len() < dscale {
                fraction.push_str(&format!("{:04}", digit(group)));
                group += 1;
            }
            fraction.truncate(dscale);
            text.push('.');
            text.push_str(&fraction);
        }

        Ok(NumericText(text))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode the binary NUMERIC header plus base-10000 digits
    fn numeric(weight: i16, sign: u16, dscale: u16, digits: &[u16]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&(digits.len() as u16).to_be_bytes());
        raw.extend_from_slice(&weight.to_be_bytes());
        raw.extend_from_slice(&sign.to_be_bytes());
        raw.extend_from_slice(&dscale.to_be_bytes());
        for d in digits {
            raw.extend_from_slice(&d.to_be_bytes());
        }
        raw
    }

    fn decode(raw: &[u8]) -> String {
        NumericText::from_sql(&Type::NUMERIC, raw).unwrap().0
    }

    #[test]
    fn test_numeric_integers() {
        assert_eq!(decode(&numeric(0, 0, 0, &[88])), "88");
        assert_eq!(decode(&numeric(1, 0, 0, &[23, 1747])), "231747");
        assert_eq!(decode(&numeric(1, 0, 0, &[1])), "10000");
        assert_eq!(decode(&numeric(0, NUMERIC_NEG, 0, &[5])), "-5");
        assert_eq!(decode(&numeric(0, 0, 0, &[])), "0");
    }

    #[test]
    fn test_numeric_fractions() {
        assert_eq!(decode(&numeric(0, 0, 1, &[77, 9000])), "77.9");
        assert_eq!(decode(&numeric(0, 0, 2, &[91])), "91.00");
        assert_eq!(decode(&numeric(-1, 0, 3, &[500])), "0.050");
        assert_eq!(decode(&numeric(-2, 0, 6, &[1200])), "0.000012");
    }

    #[test]
    fn test_numeric_special_values() {
        assert_eq!(decode(&numeric(0, NUMERIC_NAN, 0, &[])), "NaN");
        assert!(NumericText::from_sql(&Type::NUMERIC, &[0, 1]).is_err());
    }

    #[test]
    fn test_numeric_into_value() {
        assert_eq!(NumericText("88".to_string()).into_value(), Value::from(88));
        assert_eq!(NumericText("77.9".to_string()).into_value(), serde_json::json!(77.9));
        assert_eq!(
            NumericText("NaN".to_string()).into_value(),
            Value::String("NaN".to_string())
        );
    }

    #[test]
    fn test_numeric_normalizes_like_integer_columns() {
        let mut row = RawRow::new();
        row.insert("player_id".to_string(), NumericText("7".to_string()).into_value());
        row.insert("ovr".to_string(), NumericText("88.6".to_string()).into_value());
        let record = crate::normalizer::normalize_row(&row).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.overall, 88);
    }
}
