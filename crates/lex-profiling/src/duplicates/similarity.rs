//! Per-column and per-row similarity measures for fuzzy matching.

use rapidfuzz::distance::jaro_winkler;
use std::collections::HashSet;

use crate::error::PairError;
use crate::utils::{coerce_numeric, is_blank};
use crate::value::Value;

/// Strings this long or longer are compared by 3-gram overlap.
const JARO_WINKLER_MAX_CHARS: usize = 100;
const NGRAM: usize = 3;
/// Contribution of a date column whose values are more than 90 days apart.
const DATE_VETO: f64 = -5.0;
/// Date columns count this many times their weight.
const DATE_WEIGHT_FACTOR: f64 = 2.0;

/// How a weighted column is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Text,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WeightedColumn {
    pub index: usize,
    pub kind: ColumnKind,
    pub weight: f64,
}

/// Jaro-Winkler for short strings, 3-gram Jaccard overlap for long ones.
pub(crate) fn string_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest < JARO_WINKLER_MAX_CHARS {
        jaro_winkler::similarity(a.chars(), b.chars())
    } else {
        ngram_overlap(a, b)
    }
}

fn ngrams(s: &str) -> HashSet<Vec<char>> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < NGRAM {
        return HashSet::from([chars]);
    }
    chars.windows(NGRAM).map(|w| w.to_vec()).collect()
}

fn ngram_overlap(a: &str, b: &str) -> f64 {
    let left = ngrams(a);
    let right = ngrams(b);
    let union = left.union(&right).count();
    if union == 0 {
        return 1.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// `1 - min(|a - b| / max(|a|, |b|), 1)`; two zeros are identical.
pub(crate) fn numeric_similarity(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        return 1.0;
    }
    1.0 - ((a - b).abs() / scale).min(1.0)
}

/// Step similarity over a day difference. `None` past 90 days.
pub(crate) fn date_similarity(days_apart: i64) -> Option<f64> {
    match days_apart.abs() {
        0 => Some(1.0),
        1 => Some(0.5),
        2..=7 => Some(0.3),
        8..=90 => Some(0.1),
        _ => None,
    }
}

fn usable_text(value: &Value) -> Option<String> {
    let text = value.as_text()?;
    if is_blank(&text) {
        return None;
    }
    Some(text.trim().to_string())
}

/// Weighted similarity of two rows across `columns`.
///
/// Columns where either value is unusable are left out of both the sum and
/// the total weight. A date column more than 90 days apart contributes a
/// fixed negative amount that sinks the pair.
pub(crate) fn row_similarity(
    rows: &[Vec<Value>],
    i: usize,
    j: usize,
    columns: &[WeightedColumn],
) -> Result<f64, PairError> {
    let left = rows.get(i).ok_or(PairError::RowOutOfRange(i))?;
    let right = rows.get(j).ok_or(PairError::RowOutOfRange(j))?;

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for column in columns {
        let (Some(a), Some(b)) = (left.get(column.index), right.get(column.index)) else {
            continue;
        };
        match column.kind {
            ColumnKind::Date => {
                let (Some(a), Some(b)) = (a.as_datetime(), b.as_datetime()) else {
                    continue;
                };
                let weight = column.weight * DATE_WEIGHT_FACTOR;
                let days = (a - b).num_days();
                match date_similarity(days) {
                    Some(sim) => weighted_sum += sim * weight,
                    None => weighted_sum += DATE_VETO,
                }
                total_weight += weight;
            }
            ColumnKind::Text => {
                let (Some(a), Some(b)) = (usable_text(a), usable_text(b)) else {
                    continue;
                };
                let sim = match (coerce_numeric(&a), coerce_numeric(&b)) {
                    (Some(x), Some(y)) => numeric_similarity(x, y),
                    _ => string_similarity(&a, &b),
                };
                weighted_sum += sim * column.weight;
                total_weight += column.weight;
            }
        }
    }

    if total_weight == 0.0 {
        return Err(PairError::NoComparableValues(i, j));
    }
    Ok(weighted_sum / total_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn test_string_similarity() {
        assert_eq!(string_similarity("martha", "martha"), 1.0);
        assert!(string_similarity("martha", "marhta") > 0.95);
        assert!(string_similarity("abc", "xyz") < 0.1);

        let long_a = "a".repeat(60) + &"b".repeat(60);
        let long_b = "a".repeat(60) + &"c".repeat(60);
        let sim = string_similarity(&long_a, &long_b);
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_numeric_similarity() {
        assert_eq!(numeric_similarity(0.0, 0.0), 1.0);
        assert_eq!(numeric_similarity(100.0, 100.0), 1.0);
        assert!((numeric_similarity(100.0, 90.0) - 0.9).abs() < 1e-12);
        assert_eq!(numeric_similarity(5.0, -5.0), 0.0);
    }

    #[test]
    fn test_date_steps() {
        assert_eq!(date_similarity(0), Some(1.0));
        assert_eq!(date_similarity(-1), Some(0.5));
        assert_eq!(date_similarity(7), Some(0.3));
        assert_eq!(date_similarity(90), Some(0.1));
        assert_eq!(date_similarity(91), None);
    }

    #[test]
    fn test_date_veto_sinks_identical_text() {
        let rows = vec![
            vec![s("Acme Corp"), s("2023-01-01")],
            vec![s("Acme Corp"), s("2023-05-01")],
        ];
        let columns = [
            WeightedColumn {
                index: 0,
                kind: ColumnKind::Text,
                weight: 0.2,
            },
            WeightedColumn {
                index: 1,
                kind: ColumnKind::Date,
                weight: 0.8,
            },
        ];
        let sim = row_similarity(&rows, 0, 1, &columns).unwrap();
        assert!(sim < 0.0);
    }

    #[test]
    fn test_unusable_values_are_skipped() {
        let rows = vec![vec![s("Acme"), Value::Null], vec![s("Acme"), s("2023-01-01")]];
        let columns = [
            WeightedColumn {
                index: 0,
                kind: ColumnKind::Text,
                weight: 0.2,
            },
            WeightedColumn {
                index: 1,
                kind: ColumnKind::Date,
                weight: 0.8,
            },
        ];
        assert_eq!(row_similarity(&rows, 0, 1, &columns).unwrap(), 1.0);
    }

    #[test]
    fn test_pair_errors() {
        let rows = vec![vec![Value::Null], vec![Value::Null]];
        let columns = [WeightedColumn {
            index: 0,
            kind: ColumnKind::Text,
            weight: 1.0,
        }];
        assert_eq!(
            row_similarity(&rows, 0, 1, &columns),
            Err(PairError::NoComparableValues(0, 1))
        );
        assert_eq!(
            row_similarity(&rows, 0, 5, &columns),
            Err(PairError::RowOutOfRange(5))
        );
    }
}
