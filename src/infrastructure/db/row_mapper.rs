use anyhow::Result;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo};
use std::collections::BTreeMap;

use crate::domain::change::RowMap;

/// Convert a sqlx `SqliteRow` into a `RowMap`.
///
/// SQLite column affinities are loose, so decoding goes by the runtime type
/// name reported by the driver rather than the declared type.
pub fn row_to_map(row: &SqliteRow) -> Result<RowMap> {
    let mut map = BTreeMap::new();
    for col in row.columns() {
        let value = decode_column(row, col.ordinal(), col.type_info().name())?;
        map.insert(col.name().to_string(), value);
    }
    Ok(map)
}

fn decode_column(row: &SqliteRow, idx: usize, type_name: &str) -> Result<Value> {
    let upper = type_name.to_ascii_uppercase();

    let value = if upper == "NULL" {
        Value::Null
    } else if upper.contains("BOOL") {
        row.try_get::<Option<bool>, _>(idx)?
            .map(Value::Bool)
            .unwrap_or(Value::Null)
    } else if upper.contains("INT") {
        row.try_get::<Option<i64>, _>(idx)?
            .map(Value::from)
            .unwrap_or(Value::Null)
    } else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
        .iter()
        .any(|t| upper.contains(t))
    {
        match row.try_get::<Option<f64>, _>(idx)? {
            // NaN/infinity have no JSON representation; surface them as NULL
            Some(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            None => Value::Null,
        }
    } else if upper.contains("BLOB") {
        row.try_get::<Option<Vec<u8>>, _>(idx)?
            .map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(Value::Null)
    } else {
        // TEXT, DATE/DATETIME and anything unrecognised
        row.try_get::<Option<String>, _>(idx)?
            .map(Value::String)
            .unwrap_or(Value::Null)
    };

    Ok(value)
}
