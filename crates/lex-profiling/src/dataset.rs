//! Read-only access to a polars `DataFrame` as [`Value`]s.
//!
//! The profiler never mutates the caller's frame. Columns are read through
//! typed chunked arrays (or a cast copy of them) and rows are gathered
//! chunk by chunk so only one slice of one column is materialized at a time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::warn;

use crate::error::{ProfilingError, Result};
use crate::types::JsonRow;
use crate::value::Value;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Lift every cell of `series` into a [`Value`].
pub fn series_values(series: &Series) -> PolarsResult<Vec<Value>> {
    let values = match series.dtype() {
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let cast = series.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Int))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = series.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| match v {
                    Some(f) if !f.is_nan() => Value::Float(f),
                    _ => Value::Null,
                })
                .collect()
        }
        DataType::Date => {
            let cast = series.cast(&DataType::Int32)?;
            cast.i32()?
                .into_iter()
                .map(|v| v.and_then(date_from_epoch_days).map_or(Value::Null, Value::Date))
                .collect()
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let cast = series.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| {
                    v.and_then(|ts| datetime_from_timestamp(ts, unit))
                        .map_or(Value::Null, Value::DateTime)
                })
                .collect()
        }
        DataType::String => string_values(series.str()?),
        _ => {
            let cast = series.cast(&DataType::String)?;
            string_values(cast.str()?)
        }
    };
    Ok(values)
}

fn string_values(ca: &StringChunked) -> Vec<Value> {
    ca.into_iter()
        .map(|v| v.map_or(Value::Null, |s| Value::Str(s.to_string())))
        .collect()
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn datetime_from_timestamp(ts: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(ts)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ts),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ts),
    };
    dt.map(|dt| dt.naive_utc())
}

/// Values of rows `[offset, offset + len)` of `series`.
pub fn slice_values(series: &Series, offset: usize, len: usize) -> PolarsResult<Vec<Value>> {
    series_values(&series.slice(offset as i64, len))
}

/// Up to `n` evenly spaced values, always including the first one.
pub fn evenly_spaced<T: Clone>(values: &[T], n: usize) -> Vec<T> {
    if values.len() <= n {
        return values.to_vec();
    }
    let step = values.len() as f64 / n as f64;
    (0..n)
        .map(|i| values[((i as f64) * step) as usize].clone())
        .collect()
}

/// Seeded sample of `amount` row indices out of `total`, in ascending order.
/// Returns every index when `amount >= total`.
pub fn sample_indices(total: usize, amount: usize, seed: u64) -> Vec<usize> {
    if amount >= total {
        return (0..total).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, total, amount).into_vec();
    indices.sort_unstable();
    indices
}

/// Materialize the rows at `indices` (ascending) as vectors of values in
/// column order, reading each column in slices of `chunk_size` rows.
///
/// A column whose values cannot be read contributes `Value::Null` to every
/// row. Fails with `ProfilingError::DatasetUnreadable` only when no column
/// of a non-empty frame can be read.
pub fn gather_rows(
    df: &DataFrame,
    indices: &[usize],
    chunk_size: usize,
) -> Result<Vec<Vec<Value>>> {
    let mut rows: Vec<Vec<Value>> = indices
        .iter()
        .map(|_| Vec::with_capacity(df.width()))
        .collect();
    let chunk_size = chunk_size.max(1);

    let mut unreadable = Vec::new();
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        match values_at(series, indices, chunk_size) {
            Ok(values) => {
                for (row, value) in rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
            Err(e) => {
                warn!("Column '{}' unreadable, treated as null: {}", series.name(), e);
                for row in rows.iter_mut() {
                    row.push(Value::Null);
                }
                unreadable.push(format!("'{}': {}", series.name(), e));
            }
        }
    }

    if !indices.is_empty() && df.width() > 0 && unreadable.len() == df.width() {
        return Err(ProfilingError::DatasetUnreadable(format!(
            "no readable columns ({})",
            unreadable.join("; ")
        )));
    }
    Ok(rows)
}

fn values_at(series: &Series, indices: &[usize], chunk_size: usize) -> PolarsResult<Vec<Value>> {
    let mut values = Vec::with_capacity(indices.len());
    let mut cursor = 0;
    let mut offset = 0;
    while offset < series.len() && cursor < indices.len() {
        let len = chunk_size.min(series.len() - offset);
        let end = offset + len;
        if indices[cursor] < end {
            let chunk = slice_values(series, offset, len)?;
            while cursor < indices.len() && indices[cursor] < end {
                values.push(chunk[indices[cursor] - offset].clone());
                cursor += 1;
            }
        }
        offset = end;
    }
    Ok(values)
}

/// Column names of the frame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Render a row as a JSON object keyed by column name.
pub fn row_to_json(names: &[String], row: &[Value]) -> JsonRow {
    names
        .iter()
        .zip(row)
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_values_numeric_and_nan() {
        let series = Series::new("x".into(), &[Some(1.5f64), None, Some(f64::NAN)]);
        let values = series_values(&series).unwrap();
        assert_eq!(values, vec![Value::Float(1.5), Value::Null, Value::Null]);
    }

    #[test]
    fn test_series_values_strings() {
        let series = Series::new("s".into(), &[Some("a"), None, Some("")]);
        let values = series_values(&series).unwrap();
        assert_eq!(
            values,
            vec![Value::Str("a".to_string()), Value::Null, Value::Str(String::new())]
        );
    }

    #[test]
    fn test_series_values_dates() {
        let series = Series::new("d".into(), &[0i32, 19_358])
            .cast(&DataType::Date)
            .unwrap();
        let values = series_values(&series).unwrap();
        assert_eq!(
            values[0],
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        );
        assert_eq!(
            values[1],
            Value::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_sample_indices_sorted_and_deterministic() {
        let a = sample_indices(1_000, 10, 42);
        let b = sample_indices(1_000, 10, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sample_indices(5, 10, 42), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_gather_rows_across_chunks() {
        let df = df![
            "id" => [1i64, 2, 3, 4, 5],
            "name" => ["a", "b", "c", "d", "e"]
        ]
        .unwrap();

        let rows = gather_rows(&df, &[0, 3, 4], 2).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![Value::Int(4), Value::Str("d".to_string())]);
        assert_eq!(rows[2], vec![Value::Int(5), Value::Str("e".to_string())]);
    }

    fn list_column(name: &str, rows: usize) -> Column {
        let items: Vec<Series> = (0..rows)
            .map(|i| Series::new("".into(), &[i as i64, 1]))
            .collect();
        Series::new(name.into(), items).into_column()
    }

    #[test]
    fn test_gather_rows_nulls_unreadable_column() {
        let df = DataFrame::new(vec![
            Series::new("name".into(), &["a", "b", "c"]).into_column(),
            list_column("tags", 3),
        ])
        .unwrap();

        let rows = gather_rows(&df, &[0, 2], 2).unwrap();
        assert_eq!(rows[0], vec![Value::Str("a".to_string()), Value::Null]);
        assert_eq!(rows[1], vec![Value::Str("c".to_string()), Value::Null]);
    }

    #[test]
    fn test_gather_rows_fails_when_nothing_readable() {
        let df = DataFrame::new(vec![list_column("tags", 3)]).unwrap();
        let err = gather_rows(&df, &[0, 1], 2).unwrap_err();
        assert!(matches!(err, ProfilingError::DatasetUnreadable(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_evenly_spaced() {
        let values: Vec<usize> = (0..100).collect();
        let sample = evenly_spaced(&values, 4);
        assert_eq!(sample, vec![0, 25, 50, 75]);
        assert_eq!(evenly_spaced(&values[..3], 4), vec![0, 1, 2]);
    }
}
