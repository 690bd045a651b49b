//! Type-specific validity checks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ColumnType;

pub(crate) static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\.-]+@[\w\.-]+\.\w+$").expect("Invalid regex: email"));

pub(crate) static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s-]{10,}$").expect("Invalid regex: phone"));

pub(crate) static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("Invalid regex: uuid")
});

// US ZIP+4, Canadian, UK and Dutch shapes. Bare digit runs are left to
// numeric inference.
static POSTAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{5}-\d{4}$").expect("Invalid regex: ZIP+4"),
        Regex::new(r"^[A-Za-z]\d[A-Za-z][ -]?\d[A-Za-z]\d$").expect("Invalid regex: CA postal"),
        Regex::new(r"^[A-Za-z]{1,2}\d[A-Za-z\d]?\s*\d[A-Za-z]{2}$").expect("Invalid regex: UK postcode"),
        Regex::new(r"^\d{4}\s?[A-Za-z]{2}$").expect("Invalid regex: NL postcode"),
    ]
});

const POSTAL_EXCLUDED_LITERALS: [&str; 4] = ["no", "yes", "na", "n/a"];

/// Postal-code heuristic. Never accepts bare 1-3 digit numbers or the
/// literals No/Yes/NA/N/A.
pub(crate) fn is_postal_code(s: &str) -> bool {
    let trimmed = s.trim();
    let is_short_number =
        (1..=3).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_digit());
    if is_short_number
        || POSTAL_EXCLUDED_LITERALS
            .iter()
            .any(|lit| trimmed.eq_ignore_ascii_case(lit))
    {
        return false;
    }
    POSTAL_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// Whether `s` passes the validity pattern of `column_type`. Types without
/// a pattern accept everything.
pub(crate) fn matches_type_pattern(column_type: &ColumnType, s: &str) -> bool {
    let trimmed = s.trim();
    match column_type {
        ColumnType::Email => EMAIL_REGEX.is_match(trimmed),
        ColumnType::Phone => PHONE_REGEX.is_match(trimmed),
        ColumnType::Uuid => UUID_REGEX.is_match(trimmed),
        ColumnType::PostalCode => is_postal_code(trimmed),
        _ => true,
    }
}

/// Validity of a numeric column from its outlier ratio.
pub(crate) fn numeric_validity(outlier_ratio: f64) -> f64 {
    1.0 - 2.0 * outlier_ratio.min(0.5)
}

/// Share of lengths within three standard deviations of the mean length.
pub(crate) fn length_validity(lengths: &[usize]) -> f64 {
    if lengths.is_empty() {
        return 0.0;
    }
    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<usize>() as f64 / n;
    let variance = lengths
        .iter()
        .map(|&l| (l as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std = variance.sqrt();
    if std == 0.0 {
        return 1.0;
    }
    lengths
        .iter()
        .filter(|&&l| (l as f64 - mean).abs() <= 3.0 * std)
        .count() as f64
        / n
}

/// Date validity: the best explicit-format parse ratio, or the day-first
/// generic parse ratio when no explicit format parses anything.
pub(crate) fn date_validity(format_hits: &[usize], generic_hits: usize, checked: usize) -> f64 {
    if checked == 0 {
        return 0.0;
    }
    let best = format_hits.iter().copied().max().unwrap_or(0);
    let hits = if best > 0 { best } else { generic_hits };
    hits as f64 / checked as f64
}
