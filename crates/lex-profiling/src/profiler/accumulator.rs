//! Mergeable per-column accumulators.
//!
//! A [`ColumnAccumulator`] holds everything needed to finish a
//! [`ColumnProfile`] for one column: exact counters, a capped distinct-value
//! set, capped value tallies and a reservoir of numeric values. Chunked mode
//! builds one accumulator per chunk and folds it into the column's running
//! accumulator with [`ColumnAccumulator::merge`]; exact mode feeds the whole
//! column as a single chunk with [`AccumulatorLimits::exact`].

use rand::Rng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

use super::statistics::{
    Moments, iqr_outliers, merge_counts, quantile, sorted_copy, top_counts, top_outlier_values,
    truncate_counts, zscore_outliers,
};
use super::validity::{date_validity, length_validity, matches_type_pattern, numeric_validity};
use crate::config::ProfilerConfig;
use crate::quality::QualityScorer;
use crate::types::{ColumnProfile, ColumnType, Outliers};
use crate::utils::{DateFormat, is_blank, is_placeholder, parse_date_generic, value_pattern};
use crate::value::Value;

const FREQUENT_VALUES: usize = 10;
const INVALID_VALUES: usize = 3;
const PATTERN_VALUES: usize = 5;
/// Validity of types without a specific check.
const DEFAULT_VALIDITY: f64 = 0.9;

/// Bounds applied while accumulating. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AccumulatorLimits {
    pub unique_cap: Option<usize>,
    pub top_k_per_chunk: Option<usize>,
    pub reservoir_per_chunk: Option<usize>,
    pub reservoir_max: Option<usize>,
}

impl AccumulatorLimits {
    /// No bounds: every metric is exact.
    pub fn exact() -> Self {
        Self {
            unique_cap: None,
            top_k_per_chunk: None,
            reservoir_per_chunk: None,
            reservoir_max: None,
        }
    }

    pub fn chunked(config: &ProfilerConfig) -> Self {
        Self {
            unique_cap: Some(config.unique_cap),
            top_k_per_chunk: Some(config.frequent_values_per_chunk),
            reservoir_per_chunk: Some(config.reservoir_per_chunk),
            reservoir_max: Some(config.reservoir_max),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ColumnAccumulator {
    column_type: ColumnType,
    rows: usize,
    null_count: usize,
    empty_count: usize,
    placeholder_count: usize,
    /// Rows that are missing after numeric coercion (numeric types only).
    coercion_missing: usize,
    unique: HashSet<Value>,
    frequent: HashMap<String, usize>,
    invalid: HashMap<String, usize>,
    patterns: HashMap<String, usize>,
    moments: Moments,
    numeric_sample: Vec<f64>,
    pattern_checked: usize,
    pattern_hits: usize,
    date_checked: usize,
    date_format_hits: [usize; 5],
    date_generic_hits: usize,
    lengths: Vec<usize>,
}

impl ColumnAccumulator {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            rows: 0,
            null_count: 0,
            empty_count: 0,
            placeholder_count: 0,
            coercion_missing: 0,
            unique: HashSet::new(),
            frequent: HashMap::new(),
            invalid: HashMap::new(),
            patterns: HashMap::new(),
            moments: Moments::default(),
            numeric_sample: Vec::new(),
            pattern_checked: 0,
            pattern_hits: 0,
            date_checked: 0,
            date_format_hits: [0; 5],
            date_generic_hits: 0,
            lengths: Vec::new(),
        }
    }

    /// Accumulate one chunk of values, applying the per-chunk limits.
    pub fn from_chunk(
        column_type: ColumnType,
        values: &[Value],
        limits: &AccumulatorLimits,
        rng: &mut StdRng,
    ) -> Self {
        let mut acc = Self::new(column_type);
        let numeric = acc.column_type.is_numeric();
        let tracks_patterns = !numeric && !matches!(acc.column_type, ColumnType::Native(_));

        for value in values {
            acc.rows += 1;
            let Some(text) = value.as_text() else {
                acc.null_count += 1;
                if numeric {
                    acc.coercion_missing += 1;
                }
                continue;
            };

            if is_blank(&text) {
                acc.empty_count += 1;
            } else if is_placeholder(&text) {
                acc.placeholder_count += 1;
            }

            if limits.unique_cap.is_none_or(|cap| acc.unique.len() < cap) {
                acc.unique.insert(value.clone());
            }
            *acc.frequent.entry(text.to_string()).or_insert(0) += 1;

            if numeric {
                match value.as_f64() {
                    Some(x) => {
                        acc.moments.push(x);
                        acc.numeric_sample.push(x);
                    }
                    None => acc.coercion_missing += 1,
                }
                continue;
            }

            if tracks_patterns {
                *acc.patterns.entry(value_pattern(&text)).or_insert(0) += 1;
            }

            match &acc.column_type {
                ColumnType::Date => {
                    acc.date_checked += 1;
                    for (hits, format) in acc.date_format_hits.iter_mut().zip(DateFormat::ALL) {
                        if format.parse(&text).is_some() {
                            *hits += 1;
                        }
                    }
                    if parse_date_generic(&text, true).is_some() {
                        acc.date_generic_hits += 1;
                    }
                }
                ColumnType::String => acc.lengths.push(text.chars().count()),
                t if t.is_pattern_checked() => {
                    acc.pattern_checked += 1;
                    if matches_type_pattern(t, &text) {
                        acc.pattern_hits += 1;
                    } else {
                        *acc.invalid.entry(text.to_string()).or_insert(0) += 1;
                    }
                }
                _ => {}
            }
        }

        if let Some(k) = limits.top_k_per_chunk {
            acc.frequent = truncate_counts(std::mem::take(&mut acc.frequent), k);
            acc.invalid = truncate_counts(std::mem::take(&mut acc.invalid), k);
            acc.patterns = truncate_counts(std::mem::take(&mut acc.patterns), k);
        }
        if let Some(k) = limits.reservoir_per_chunk {
            acc.numeric_sample = reservoir(std::mem::take(&mut acc.numeric_sample), k, rng);
            acc.lengths = reservoir(std::mem::take(&mut acc.lengths), k, rng);
        }
        acc
    }

    /// Fold `other` into `self`. Counters add exactly; the distinct set and
    /// the samples are re-capped with the global limits.
    pub fn merge(&mut self, other: ColumnAccumulator, limits: &AccumulatorLimits, rng: &mut StdRng) {
        self.rows += other.rows;
        self.null_count += other.null_count;
        self.empty_count += other.empty_count;
        self.placeholder_count += other.placeholder_count;
        self.coercion_missing += other.coercion_missing;

        for value in other.unique {
            if limits.unique_cap.is_some_and(|cap| self.unique.len() >= cap) {
                break;
            }
            self.unique.insert(value);
        }

        merge_counts(&mut self.frequent, other.frequent);
        merge_counts(&mut self.invalid, other.invalid);
        merge_counts(&mut self.patterns, other.patterns);
        self.moments.merge(&other.moments);

        self.pattern_checked += other.pattern_checked;
        self.pattern_hits += other.pattern_hits;
        self.date_checked += other.date_checked;
        for (mine, theirs) in self.date_format_hits.iter_mut().zip(other.date_format_hits) {
            *mine += theirs;
        }
        self.date_generic_hits += other.date_generic_hits;

        self.numeric_sample.extend(other.numeric_sample);
        self.lengths.extend(other.lengths);
        if let Some(k) = limits.reservoir_max {
            self.numeric_sample = reservoir(std::mem::take(&mut self.numeric_sample), k, rng);
            self.lengths = reservoir(std::mem::take(&mut self.lengths), k, rng);
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Missing count: nulls, blanks and placeholders, replaced by the
    /// numeric-coercion count when that is larger but still at or below
    /// `max_ratio` of all rows.
    fn missing_count(&self, total_rows: usize, max_ratio: f64) -> usize {
        let base = self.null_count + self.empty_count + self.placeholder_count;
        let coerced = self.coercion_missing;
        if self.column_type.is_numeric()
            && coerced > base
            && coerced as f64 <= max_ratio * total_rows as f64
        {
            coerced
        } else {
            base
        }
    }

    fn validity(&self, outlier_ratio: f64) -> f64 {
        match &self.column_type {
            ColumnType::Integer | ColumnType::Float => {
                if self.numeric_sample.is_empty() {
                    0.0
                } else {
                    numeric_validity(outlier_ratio)
                }
            }
            ColumnType::Date => date_validity(
                &self.date_format_hits,
                self.date_generic_hits,
                self.date_checked,
            ),
            ColumnType::String => length_validity(&self.lengths),
            t if t.is_pattern_checked() => {
                if self.pattern_checked == 0 {
                    0.0
                } else {
                    self.pattern_hits as f64 / self.pattern_checked as f64
                }
            }
            _ => {
                if self.rows > self.null_count {
                    DEFAULT_VALIDITY
                } else {
                    0.0
                }
            }
        }
    }

    /// Turn the accumulated state into a finished profile.
    pub fn finish(
        self,
        column_name: &str,
        total_rows: usize,
        config: &ProfilerConfig,
        scorer: &QualityScorer,
    ) -> ColumnProfile {
        let missing_count = self
            .missing_count(total_rows, config.numeric_missing_max_ratio)
            .min(total_rows);
        let count = total_rows - missing_count;
        let unique_count = self.unique.len();
        let ratio = |n: usize| {
            if total_rows == 0 {
                0.0
            } else {
                n as f64 / total_rows as f64
            }
        };
        let completeness = ratio(count);
        let uniqueness = ratio(unique_count);

        let mut outlier_ratio = 0.0;
        let mut outliers = None;
        let mut median_value = None;
        if self.column_type.is_numeric() && !self.numeric_sample.is_empty() {
            let std = self.moments.std_dev().unwrap_or(0.0);
            let z = zscore_outliers(&self.numeric_sample, self.moments.mean, std);
            let iqr = iqr_outliers(&self.numeric_sample);
            outlier_ratio = z.len() as f64 / self.numeric_sample.len() as f64;
            median_value = Some(quantile(&sorted_copy(&self.numeric_sample), 0.5));
            outliers = Some(Outliers {
                z_score: top_outlier_values(&z),
                iqr: top_outlier_values(&iqr),
            });
        }
        let has_numbers = self.moments.count > 0;
        let validity = self.validity(outlier_ratio);

        ColumnProfile {
            column_name: column_name.to_string(),
            count,
            null_count: self.null_count,
            missing_count,
            unique_count,
            frequent_values: top_counts(&self.frequent, FREQUENT_VALUES),
            invalid_values: top_counts(&self.invalid, INVALID_VALUES),
            patterns: top_counts(&self.patterns, PATTERN_VALUES),
            quality_score: scorer.score(completeness, uniqueness, validity),
            completeness,
            uniqueness,
            validity,
            min_value: has_numbers.then_some(self.moments.min),
            max_value: has_numbers.then_some(self.moments.max),
            mean_value: has_numbers.then_some(self.moments.mean),
            median_value,
            std_dev: if has_numbers {
                self.moments.std_dev()
            } else {
                None
            },
            outliers,
            error: None,
            data_type: self.column_type,
        }
    }
}

/// Uniform sample of at most `k` items (Algorithm R).
fn reservoir<T>(items: Vec<T>, k: usize, rng: &mut StdRng) -> Vec<T> {
    if items.len() <= k {
        return items;
    }
    let mut kept = Vec::with_capacity(k);
    for (i, item) in items.into_iter().enumerate() {
        if i < k {
            kept.push(item);
        } else {
            let j = rng.gen_range(0..=i);
            if j < k {
                kept[j] = item;
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn finish(acc: ColumnAccumulator, total: usize) -> ColumnProfile {
        acc.finish("col", total, &ProfilerConfig::default(), &QualityScorer::default())
    }

    #[test]
    fn test_missing_signals_for_text_column() {
        let values = vec![
            Value::Str(String::new()),
            Value::Str(" ".to_string()),
            Value::Str("n/a".to_string()),
            Value::Str("NULL".to_string()),
            Value::Null,
            Value::Str("5".to_string()),
        ];
        let acc = ColumnAccumulator::from_chunk(
            ColumnType::String,
            &values,
            &AccumulatorLimits::exact(),
            &mut rng(),
        );
        let profile = finish(acc, values.len());
        assert_eq!(profile.null_count, 1);
        assert_eq!(profile.missing_count, 5);
        assert_eq!(profile.count, 1);
    }

    #[test]
    fn test_numeric_coercion_failures_count_as_missing() {
        let values: Vec<Value> = ["1", "2", "abc", "xyz", "5", "6", "7", "8", "9", "10"]
            .iter()
            .map(|s| Value::Str(s.to_string()))
            .collect();
        let acc = ColumnAccumulator::from_chunk(
            ColumnType::Integer,
            &values,
            &AccumulatorLimits::exact(),
            &mut rng(),
        );
        let profile = finish(acc, values.len());
        assert_eq!(profile.missing_count, 2);
        assert_eq!(profile.count, 8);
    }

    #[test]
    fn test_coercion_count_rejected_above_ratio() {
        let mut values: Vec<Value> = (0..19).map(|i| Value::Str(format!("word{i}"))).collect();
        values.push(Value::Str("3".to_string()));
        let acc = ColumnAccumulator::from_chunk(
            ColumnType::Integer,
            &values,
            &AccumulatorLimits::exact(),
            &mut rng(),
        );
        let profile = finish(acc, values.len());
        // 19 of 20 fail coercion (95%), above the 90% guard.
        assert_eq!(profile.missing_count, 0);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let values: Vec<Value> = (0..100).map(|i| Value::Int(i % 7)).collect();
        let limits = AccumulatorLimits::exact();
        let mut rng = rng();

        let whole = ColumnAccumulator::from_chunk(ColumnType::Integer, &values, &limits, &mut rng);
        let mut merged =
            ColumnAccumulator::from_chunk(ColumnType::Integer, &values[..40], &limits, &mut rng);
        let tail =
            ColumnAccumulator::from_chunk(ColumnType::Integer, &values[40..], &limits, &mut rng);
        merged.merge(tail, &limits, &mut rng);

        let a = finish(whole, 100);
        let b = finish(merged, 100);
        assert_eq!(a.unique_count, b.unique_count);
        assert_eq!(a.frequent_values, b.frequent_values);
        assert_eq!(a.min_value, b.min_value);
        assert!((a.mean_value.unwrap() - b.mean_value.unwrap()).abs() < 1e-9);
        assert!((a.std_dev.unwrap() - b.std_dev.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_chunked_limits_cap_unique_and_sample() {
        let config = ProfilerConfig::default();
        let limits = AccumulatorLimits {
            unique_cap: Some(10),
            reservoir_max: Some(50),
            ..AccumulatorLimits::chunked(&config)
        };
        let mut rng = rng();
        let mut acc = ColumnAccumulator::new(ColumnType::Integer);
        for chunk in 0..5 {
            let values: Vec<Value> = (0..100).map(|i| Value::Int(chunk * 100 + i)).collect();
            let part = ColumnAccumulator::from_chunk(ColumnType::Integer, &values, &limits, &mut rng);
            acc.merge(part, &limits, &mut rng);
        }
        assert_eq!(acc.rows(), 500);
        assert_eq!(acc.unique.len(), 10);
        assert_eq!(acc.numeric_sample.len(), 50);
        assert_eq!(acc.moments.count, 500);

        let profile = finish(acc, 500);
        assert_eq!(profile.min_value, Some(0.0));
        assert_eq!(profile.max_value, Some(499.0));
    }

    #[test]
    fn test_pattern_type_invalid_values() {
        let values: Vec<Value> = ["a@x.com", "b@x.com", "bad", "bad", "worse"]
            .iter()
            .map(|s| Value::Str(s.to_string()))
            .collect();
        let acc = ColumnAccumulator::from_chunk(
            ColumnType::Email,
            &values,
            &AccumulatorLimits::exact(),
            &mut rng(),
        );
        let profile = finish(acc, 5);
        assert!((profile.validity - 0.4).abs() < 1e-12);
        assert_eq!(profile.invalid_values[0].value, "bad");
        assert_eq!(profile.invalid_values[0].count, 2);
        assert_eq!(profile.invalid_values.len(), 2);
    }

    #[test]
    fn test_reservoir_keeps_k_items() {
        let sample = reservoir((0..1000).collect::<Vec<_>>(), 10, &mut rng());
        assert_eq!(sample.len(), 10);
        assert_eq!(reservoir(vec![1, 2], 10, &mut rng()), vec![1, 2]);
    }
}
