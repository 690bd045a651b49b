//! Type inference logic for column analysis.

use polars::prelude::*;
use std::collections::HashSet;

use super::validity::{EMAIL_REGEX, PHONE_REGEX, UUID_REGEX, is_postal_code};
use crate::types::ColumnType;
use crate::utils::{DtypeCategory, get_dtype_category, parse_date_generic};
use crate::value::Value;

/// Share of values a pattern must match to claim the column.
const PATTERN_MATCH_RATIO: f64 = 0.5;
/// Share of values that must coerce to numbers for a numeric column.
const NUMERIC_RATIO: f64 = 0.8;
/// A postal code column needs more distinct values than this.
const MIN_POSTAL_DISTINCT: usize = 3;

/// Infer the semantic type of a column from its storage type and a sample
/// of its values.
///
/// Natively numeric columns are typed by storage. String-like columns go
/// through the checks in order, first match wins: date, email, phone, uuid,
/// postal code, numeric, string. Other storage types pass through by name.
pub(crate) fn infer_column_type(dtype: &DataType, sample: &[Value]) -> ColumnType {
    match get_dtype_category(dtype) {
        DtypeCategory::Integer => return ColumnType::Integer,
        DtypeCategory::Float => return ColumnType::Float,
        DtypeCategory::String => {}
        DtypeCategory::Datetime | DtypeCategory::Boolean | DtypeCategory::Other => {
            return ColumnType::Native(dtype.to_string());
        }
    }

    let texts: Vec<String> = sample
        .iter()
        .filter_map(|v| v.as_text().map(|t| t.into_owned()))
        .collect();
    infer_text_type(&texts)
}

fn infer_text_type(texts: &[String]) -> ColumnType {
    let Some(first) = texts.first() else {
        return ColumnType::String;
    };

    if parse_date_generic(first, true).is_some() {
        return ColumnType::Date;
    }
    if match_ratio(texts, |s| EMAIL_REGEX.is_match(s)) > PATTERN_MATCH_RATIO {
        return ColumnType::Email;
    }
    if match_ratio(texts, |s| PHONE_REGEX.is_match(s)) > PATTERN_MATCH_RATIO {
        return ColumnType::Phone;
    }
    if match_ratio(texts, |s| UUID_REGEX.is_match(s)) > PATTERN_MATCH_RATIO {
        return ColumnType::Uuid;
    }
    if match_ratio(texts, is_postal_code) > PATTERN_MATCH_RATIO {
        let distinct: HashSet<&str> = texts.iter().map(|s| s.as_str()).collect();
        if distinct.len() > MIN_POSTAL_DISTINCT {
            return ColumnType::PostalCode;
        }
    }

    let coerced: Vec<f64> = texts
        .iter()
        .filter_map(|s| crate::utils::coerce_numeric(s))
        .collect();
    if coerced.len() as f64 / texts.len() as f64 >= NUMERIC_RATIO {
        return if coerced.iter().all(|v| v.fract() == 0.0) {
            ColumnType::Integer
        } else {
            ColumnType::Float
        };
    }

    ColumnType::String
}

fn match_ratio(texts: &[String], matches: impl Fn(&str) -> bool) -> f64 {
    if texts.is_empty() {
        return 0.0;
    }
    texts.iter().filter(|s| matches(s.trim())).count() as f64 / texts.len() as f64
}
