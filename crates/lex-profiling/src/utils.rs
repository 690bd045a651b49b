//! Shared utilities for the profiling engine.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a storage data type for profiling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Signed or unsigned integers
    Integer,
    /// Floating point numbers
    Float,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_integer_dtype(dtype) {
        DtypeCategory::Integer
    } else if is_float_dtype(dtype) {
        DtypeCategory::Float
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Missing Value Utilities
// =============================================================================

/// String tokens that stand in for a missing value.
pub const PLACEHOLDER_TOKENS: [&str; 6] = ["n/a", "null", "none", "missing", "?", "-"];

/// Check if a string is a placeholder for a missing value (case-insensitive).
///
/// # Example
///
/// ```rust,ignore
/// use lex_profiling::utils::is_placeholder;
///
/// assert!(is_placeholder("N/A"));
/// assert!(is_placeholder(" NULL "));
/// assert!(!is_placeholder("42"));
/// ```
pub fn is_placeholder(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    PLACEHOLDER_TOKENS.iter().any(|&token| lower == token)
}

/// Check if a string is empty or whitespace only.
#[inline]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// =============================================================================
// Numeric Parsing Utilities
// =============================================================================

/// Coerce a string to a finite number. Surrounding whitespace is ignored;
/// anything else that fails to parse (or parses to NaN/inf) yields `None`.
pub fn coerce_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Date Parsing Utilities
// =============================================================================

/// Loose date patterns used to spot date-like string columns.
pub static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{4}$").expect("Invalid regex: DD-MM-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}[\sT]\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: datetime"),
        Regex::new(r"^\d{1,2}\s[A-Za-z]{3,9}\s\d{4}$").expect("Invalid regex: DD Mon YYYY"),
        Regex::new(r"^[A-Za-z]{3,9}\s\d{1,2},?\s\d{4}$").expect("Invalid regex: Mon DD YYYY"),
    ]
});

/// Check if a string looks like a date by pattern alone.
pub fn looks_like_date(s: &str) -> bool {
    let trimmed = s.trim();
    DATE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// The explicit formats tried when scoring date validity, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// DD-MM-YYYY
    DayMonthDash,
    /// DD/MM/YYYY
    DayMonthSlash,
    /// YYYY-MM-DD with optional time
    Iso,
    /// MM-DD-YYYY
    MonthDayDash,
    /// MM/DD/YYYY
    MonthDaySlash,
}

impl DateFormat {
    pub const ALL: [DateFormat; 5] = [
        DateFormat::DayMonthDash,
        DateFormat::DayMonthSlash,
        DateFormat::Iso,
        DateFormat::MonthDayDash,
        DateFormat::MonthDaySlash,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DayMonthDash => "DD-MM-YYYY",
            Self::DayMonthSlash => "DD/MM/YYYY",
            Self::Iso => "ISO",
            Self::MonthDayDash => "MM-DD-YYYY",
            Self::MonthDaySlash => "MM/DD/YYYY",
        }
    }

    /// Parse `s` strictly in this format.
    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        match self {
            Self::DayMonthDash => parse_naive_date(s, "%d-%m-%Y"),
            Self::DayMonthSlash => parse_naive_date(s, "%d/%m/%Y"),
            Self::MonthDayDash => parse_naive_date(s, "%m-%d-%Y"),
            Self::MonthDaySlash => parse_naive_date(s, "%m/%d/%Y"),
            Self::Iso => parse_naive_date(s, "%Y-%m-%d")
                .or_else(|| parse_naive_datetime(s, &ISO_DATETIME_FORMATS))
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())),
        }
    }
}

const ISO_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DAY_FIRST_FORMATS: [&str; 6] = [
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y",
];

const MONTH_FIRST_FORMATS: [&str; 6] = [
    "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y",
];

const NAMED_MONTH_FORMATS: [&str; 6] = [
    "%d %b %Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y", "%b %d %Y", "%B %d %Y",
];

fn parse_naive_date(s: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, fmt)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_naive_datetime(s: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Generic date parser accepting ISO dates and datetimes, RFC 3339,
/// slash/dash/dot separated day-month orders and named months.
///
/// Bare numbers are never dates. `day_first` decides whether an ambiguous
/// `01/02/2024` is read as 1 February or 2 January.
pub fn parse_date_generic(s: &str, day_first: bool) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.len() < 6 || coerce_numeric(s).is_some() {
        return None;
    }
    if let Some(parsed) = DateFormat::Iso.parse(s) {
        return Some(parsed);
    }
    if let Some(parsed) = parse_naive_date(s, "%Y/%m/%d") {
        return Some(parsed);
    }
    let ordered = if day_first {
        &DAY_FIRST_FORMATS
    } else {
        &MONTH_FIRST_FORMATS
    };
    ordered
        .iter()
        .chain(NAMED_MONTH_FORMATS.iter())
        .find_map(|fmt| parse_naive_date(s, fmt))
        .or_else(|| DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.naive_utc()))
}

// =============================================================================
// Pattern Utilities
// =============================================================================

/// Character-shape pattern of a value: letters become `A`, digits `9`,
/// everything else is kept. Long values are cut at 32 characters.
pub fn value_pattern(s: &str) -> String {
    s.chars()
        .take(32)
        .map(|c| {
            if c.is_alphabetic() {
                'A'
            } else if c.is_ascii_digit() {
                '9'
            } else {
                c
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
