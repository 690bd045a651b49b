//! Statistical analysis functions for column profiling.

use std::collections::HashMap;

use crate::types::{OutlierValue, ValueCount};

/// Values further than this many standard deviations from the mean are
/// Z-score outliers.
const Z_THRESHOLD: f64 = 3.0;
/// Classical Z-scores over `n` values are bounded by `sqrt(n - 1)`, so they
/// cannot pass the threshold at or below this size.
const CLASSICAL_Z_MIN_VALUES: usize = 11;
const IQR_FACTOR: f64 = 1.5;
const MAX_OUTLIER_VALUES: usize = 3;

/// Running count, mean, variance and range with a lossless merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Moments {
    pub count: usize,
    pub mean: f64,
    m2: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for Moments {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Moments {
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    pub fn merge(&mut self, other: &Moments) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / total as f64;
        self.m2 += other.m2
            + delta * delta * (self.count as f64 * other.count as f64) / total as f64;
        self.count = total;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.m2 / self.count as f64).max(0.0).sqrt())
    }
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

pub(crate) fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Values whose Z-score exceeds the threshold.
///
/// Uses the classical score against `mean` and `std`. Samples too small for
/// a classical score to ever pass the threshold fall back to the robust
/// score around the median (MAD based, mean absolute deviation when the MAD
/// is zero).
pub(crate) fn zscore_outliers(values: &[f64], mean: f64, std: f64) -> Vec<f64> {
    if values.len() >= CLASSICAL_Z_MIN_VALUES {
        if std == 0.0 {
            return Vec::new();
        }
        return values
            .iter()
            .copied()
            .filter(|x| ((x - mean) / std).abs() > Z_THRESHOLD)
            .collect();
    }

    if values.len() < 3 {
        return Vec::new();
    }
    let sorted = sorted_copy(values);
    let median = quantile(&sorted, 0.5);
    let deviations = sorted_copy(&values.iter().map(|x| (x - median).abs()).collect::<Vec<_>>());
    let mad = quantile(&deviations, 0.5);
    let scale = if mad > 0.0 {
        mad / 0.6745
    } else {
        let mean_ad = deviations.iter().sum::<f64>() / deviations.len() as f64;
        mean_ad * 1.253_314
    };
    if scale == 0.0 {
        return Vec::new();
    }
    values
        .iter()
        .copied()
        .filter(|x| ((x - median) / scale).abs() > Z_THRESHOLD)
        .collect()
}

/// Values outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
pub(crate) fn iqr_outliers(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let sorted = sorted_copy(values);
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FACTOR * iqr;
    let upper = q3 + IQR_FACTOR * iqr;
    values
        .iter()
        .copied()
        .filter(|&x| x < lower || x > upper)
        .collect()
}

/// The most frequent offending values with their counts.
pub(crate) fn top_outlier_values(outliers: &[f64]) -> Vec<OutlierValue> {
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for &x in outliers {
        counts.entry(x.to_bits()).or_insert((x, 0)).1 += 1;
    }
    let mut ranked: Vec<(f64, usize)> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.total_cmp(&b.0)));
    ranked
        .into_iter()
        .take(MAX_OUTLIER_VALUES)
        .map(|(value, count)| OutlierValue { value, count })
        .collect()
}

/// The `k` largest counts, ties broken by value so output is reproducible.
pub(crate) fn top_counts(counts: &HashMap<String, usize>, k: usize) -> Vec<ValueCount> {
    let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(k)
        .map(|(value, &count)| ValueCount {
            value: value.clone(),
            count,
        })
        .collect()
}

/// Keep only the `k` largest entries of a tally.
pub(crate) fn truncate_counts(counts: HashMap<String, usize>, k: usize) -> HashMap<String, usize> {
    if counts.len() <= k {
        return counts;
    }
    top_counts(&counts, k)
        .into_iter()
        .map(|vc| (vc.value, vc.count))
        .collect()
}

/// Add `other` into `into`.
pub(crate) fn merge_counts(into: &mut HashMap<String, usize>, other: HashMap<String, usize>) {
    for (value, count) in other {
        *into.entry(value).or_insert(0) += count;
    }
}
