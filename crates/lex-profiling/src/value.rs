//! Tagged cell values.
//!
//! Every cell the profiler looks at is lifted into a [`Value`], so the rest of
//! the engine pattern-matches on a closed set of variants instead of on polars
//! `AnyValue`s. Floating NaN is lifted as [`Value::Null`].

use chrono::{NaiveDate, NaiveDateTime};
use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use crate::utils::{coerce_numeric, parse_date_generic};

/// A single cell of the dataset.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String cast of the value, `None` for nulls.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Str(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::Int(i) => Some(Cow::Owned(i.to_string())),
            Value::Float(f) => Some(Cow::Owned(format_float(*f))),
            Value::Date(d) => Some(Cow::Owned(d.format("%Y-%m-%d").to_string())),
            Value::DateTime(dt) => Some(Cow::Owned(dt.format("%Y-%m-%d %H:%M:%S").to_string())),
        }
    }

    /// Numeric coercion. Strings are parsed after trimming; anything that
    /// does not yield a finite number is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => coerce_numeric(s),
            _ => None,
        }
    }

    /// Date coercion: native dates pass through, strings use the generic parser.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            Value::DateTime(dt) => Some(*dt),
            Value::Str(s) => parse_date_generic(s, true),
            _ => None,
        }
    }

    /// Strict JSON representation: dates become ISO-8601 strings and
    /// non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
        }
    }
}

/// Floats render with a trailing `.0` when integral so `5.0` and `5` stay
/// distinguishable in value counts.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_key(*a) == float_key(*b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => float_key(*f).hash(state),
            Value::Str(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

/// Bit pattern used for float equality, with -0.0 folded into 0.0.
fn float_key(f: f64) -> u64 {
    if f == 0.0 { 0 } else { f.to_bits() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_as_text() {
        assert_eq!(Value::Null.as_text(), None);
        assert_eq!(Value::Int(42).as_text().unwrap(), "42");
        assert_eq!(Value::Float(5.0).as_text().unwrap(), "5.0");
        assert_eq!(Value::Float(2.5).as_text().unwrap(), "2.5");
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert_eq!(Value::Date(date).as_text().unwrap(), "2023-01-02");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Str(" 4.5 ".to_string()).as_f64(), Some(4.5));
        assert_eq!(Value::Str("n/a".to_string()).as_f64(), None);
        assert_eq!(Value::Str("NaN".to_string()).as_f64(), None);
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_json_coercion() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            Value::DateTime(dt).to_json(),
            serde_json::json!("2024-03-01T12:30:00")
        );
    }

    #[test]
    fn test_hash_eq_folds_negative_zero() {
        let mut set = HashSet::new();
        set.insert(Value::Float(0.0));
        set.insert(Value::Float(-0.0));
        set.insert(Value::Int(0));
        assert_eq!(set.len(), 2);
    }
}
