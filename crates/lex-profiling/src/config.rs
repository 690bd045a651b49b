//! Configuration types for the profiling engine.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic profiler setup.

use serde::{Deserialize, Serialize};

/// Settings for exact and fuzzy duplicate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    /// Maximum rows inspected by exact duplicate detection.
    /// Default: 100,000
    pub exact_sample_size: usize,

    /// Datasets with more rows than this are sampled down to
    /// `large_dataset_sample` rows for exact detection.
    /// Default: 10,000
    pub large_dataset_rows: usize,

    /// Sample size used for exact detection on large datasets.
    /// Default: 1,000
    pub large_dataset_sample: usize,

    /// Minimum weighted similarity (0.0 - 1.0) for two rows to be fuzzy duplicates.
    /// Default: 0.95
    pub fuzzy_threshold: f64,

    /// Maximum rows sampled for fuzzy detection.
    /// Default: 1,000
    pub fuzzy_max_rows: usize,

    /// Group formation stops once this many fuzzy groups exist.
    /// Default: 10
    pub max_groups: usize,

    /// Number of fuzzy groups returned in the result.
    /// Default: 5
    pub reported_groups: usize,

    /// Number of example rows returned by exact detection.
    /// Default: 10
    pub example_rows: usize,

    /// Seed for row sampling.
    /// Default: 42
    pub random_seed: u64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            exact_sample_size: 100_000,
            large_dataset_rows: 10_000,
            large_dataset_sample: 1_000,
            fuzzy_threshold: 0.95,
            fuzzy_max_rows: 1_000,
            max_groups: 10,
            reported_groups: 5,
            example_rows: 10,
            random_seed: 42,
        }
    }
}

impl DuplicateConfig {
    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "fuzzy_threshold".to_string(),
                value: self.fuzzy_threshold,
            });
        }
        if self.large_dataset_sample == 0 {
            return Err(ConfigValidationError::ZeroValue("large_dataset_sample"));
        }
        if self.max_groups == 0 {
            return Err(ConfigValidationError::ZeroValue("max_groups"));
        }
        Ok(())
    }
}

/// Configuration for the [`DataProfiler`](crate::profiler::DataProfiler).
///
/// Use [`ProfilerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_profiling::config::ProfilerConfig;
///
/// let config = ProfilerConfig::builder()
///     .max_memory_mb(512)
///     .chunk_size(50_000)
///     .fuzzy_threshold(0.9)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Memory budget in megabytes. Chunked mode is used when the dataset's
    /// estimated in-memory size exceeds half of this budget.
    /// Default: 1000
    pub max_memory_mb: usize,

    /// Rows per chunk in chunked mode.
    /// Default: 100,000
    pub chunk_size: usize,

    /// Worker threads used to profile columns in chunked mode.
    /// Default: 4
    pub worker_threads: usize,

    /// Maximum rows sampled for type inference.
    /// Default: 10,000
    pub inference_sample_rows: usize,

    /// Cap on the distinct-value set kept per column in chunked mode.
    /// Default: 1,000
    pub unique_cap: usize,

    /// Top-K value counts kept per chunk before merging in chunked mode.
    /// Default: 20
    pub frequent_values_per_chunk: usize,

    /// Numeric values reservoir-sampled per chunk in chunked mode.
    /// Default: 1,000
    pub reservoir_per_chunk: usize,

    /// Global cap on the numeric sample per column in chunked mode.
    /// Default: 10,000
    pub reservoir_max: usize,

    /// Numeric-coercion failures replace the null/empty/placeholder count only
    /// when they stay at or below this share of rows (0.0 - 1.0).
    /// Default: 0.9
    pub numeric_missing_max_ratio: f64,

    /// Seed for sampling.
    /// Default: 42
    pub random_seed: u64,

    /// Whether [`DataProfiler::profile`](crate::profiler::DataProfiler::profile)
    /// also runs duplicate detection.
    /// Default: true
    pub detect_duplicates: bool,

    /// Duplicate detection settings.
    pub duplicates: DuplicateConfig,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            max_memory_mb: 1000,
            chunk_size: 100_000,
            worker_threads: 4,
            inference_sample_rows: 10_000,
            unique_cap: 1_000,
            frequent_values_per_chunk: 20,
            reservoir_per_chunk: 1_000,
            reservoir_max: 10_000,
            numeric_missing_max_ratio: 0.9,
            random_seed: 42,
            detect_duplicates: true,
            duplicates: DuplicateConfig::default(),
        }
    }
}

impl ProfilerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProfilerConfigBuilder {
        ProfilerConfigBuilder::default()
    }

    /// Memory threshold in bytes above which chunked mode is used.
    pub fn chunking_threshold_bytes(&self) -> usize {
        self.max_memory_mb.saturating_mul(1024 * 1024) / 2
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.chunk_size == 0 {
            return Err(ConfigValidationError::ZeroValue("chunk_size"));
        }
        if self.worker_threads == 0 {
            return Err(ConfigValidationError::ZeroValue("worker_threads"));
        }
        if self.inference_sample_rows == 0 {
            return Err(ConfigValidationError::ZeroValue("inference_sample_rows"));
        }
        if self.reservoir_per_chunk == 0 || self.reservoir_max == 0 {
            return Err(ConfigValidationError::ZeroValue("reservoir size"));
        }
        if !(0.0..=1.0).contains(&self.numeric_missing_max_ratio) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "numeric_missing_max_ratio".to_string(),
                value: self.numeric_missing_max_ratio,
            });
        }
        self.duplicates.validate()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("'{0}' must be at least 1")]
    ZeroValue(&'static str),
}

/// Builder for [`ProfilerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ProfilerConfigBuilder {
    max_memory_mb: Option<usize>,
    chunk_size: Option<usize>,
    worker_threads: Option<usize>,
    inference_sample_rows: Option<usize>,
    unique_cap: Option<usize>,
    numeric_missing_max_ratio: Option<f64>,
    random_seed: Option<u64>,
    detect_duplicates: Option<bool>,
    exact_sample_size: Option<usize>,
    fuzzy_threshold: Option<f64>,
    fuzzy_max_rows: Option<usize>,
}

impl ProfilerConfigBuilder {
    /// Set the memory budget in megabytes.
    ///
    /// A budget of 0 forces chunked mode for any non-empty dataset.
    pub fn max_memory_mb(mut self, mb: usize) -> Self {
        self.max_memory_mb = Some(mb);
        self
    }

    /// Set the number of rows per chunk.
    pub fn chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = Some(rows);
        self
    }

    /// Set the number of worker threads for chunked mode.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Set the maximum rows sampled for type inference.
    pub fn inference_sample_rows(mut self, rows: usize) -> Self {
        self.inference_sample_rows = Some(rows);
        self
    }

    /// Set the cap on distinct values tracked per column in chunked mode.
    pub fn unique_cap(mut self, cap: usize) -> Self {
        self.unique_cap = Some(cap);
        self
    }

    /// Set the rejection ratio for numeric-coercion based missing detection.
    ///
    /// # Arguments
    /// * `ratio` - Value between 0.0 and 1.0 (e.g., 0.9 = 90%)
    pub fn numeric_missing_max_ratio(mut self, ratio: f64) -> Self {
        self.numeric_missing_max_ratio = Some(ratio);
        self
    }

    /// Set the sampling seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Enable or disable duplicate detection during profiling.
    pub fn detect_duplicates(mut self, detect: bool) -> Self {
        self.detect_duplicates = Some(detect);
        self
    }

    /// Set the maximum rows inspected by exact duplicate detection.
    pub fn exact_sample_size(mut self, rows: usize) -> Self {
        self.exact_sample_size = Some(rows);
        self
    }

    /// Set the fuzzy duplicate similarity threshold.
    pub fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = Some(threshold);
        self
    }

    /// Set the maximum rows sampled for fuzzy duplicate detection.
    pub fn fuzzy_max_rows(mut self, rows: usize) -> Self {
        self.fuzzy_max_rows = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ProfilerConfig` or an error if validation fails.
    pub fn build(self) -> Result<ProfilerConfig, ConfigValidationError> {
        let defaults = ProfilerConfig::default();
        let random_seed = self.random_seed.unwrap_or(defaults.random_seed);
        let duplicates = DuplicateConfig {
            exact_sample_size: self
                .exact_sample_size
                .unwrap_or(defaults.duplicates.exact_sample_size),
            fuzzy_threshold: self
                .fuzzy_threshold
                .unwrap_or(defaults.duplicates.fuzzy_threshold),
            fuzzy_max_rows: self
                .fuzzy_max_rows
                .unwrap_or(defaults.duplicates.fuzzy_max_rows),
            random_seed,
            ..defaults.duplicates
        };

        let config = ProfilerConfig {
            max_memory_mb: self.max_memory_mb.unwrap_or(defaults.max_memory_mb),
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            worker_threads: self.worker_threads.unwrap_or(defaults.worker_threads),
            inference_sample_rows: self
                .inference_sample_rows
                .unwrap_or(defaults.inference_sample_rows),
            unique_cap: self.unique_cap.unwrap_or(defaults.unique_cap),
            numeric_missing_max_ratio: self
                .numeric_missing_max_ratio
                .unwrap_or(defaults.numeric_missing_max_ratio),
            random_seed,
            detect_duplicates: self.detect_duplicates.unwrap_or(defaults.detect_duplicates),
            duplicates,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProfilerConfig::default();
        assert_eq!(config.max_memory_mb, 1000);
        assert_eq!(config.chunk_size, 100_000);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.numeric_missing_max_ratio, 0.9);
        assert_eq!(config.duplicates.fuzzy_threshold, 0.95);
        assert_eq!(config.duplicates.fuzzy_max_rows, 1_000);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = ProfilerConfig::builder().build().unwrap();
        assert_eq!(config, ProfilerConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ProfilerConfig::builder()
            .max_memory_mb(64)
            .chunk_size(500)
            .fuzzy_threshold(0.8)
            .random_seed(7)
            .detect_duplicates(false)
            .build()
            .unwrap();

        assert_eq!(config.max_memory_mb, 64);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.duplicates.fuzzy_threshold, 0.8);
        assert_eq!(config.duplicates.random_seed, 7);
        assert!(!config.detect_duplicates);
    }

    #[test]
    fn test_chunking_threshold_is_half_the_budget() {
        let config = ProfilerConfig::builder().max_memory_mb(2).build().unwrap();
        assert_eq!(config.chunking_threshold_bytes(), 1024 * 1024);
    }

    #[test]
    fn test_validation_zero_chunk_size() {
        let result = ProfilerConfig::builder().chunk_size(0).build();
        assert_eq!(
            result.unwrap_err(),
            ConfigValidationError::ZeroValue("chunk_size")
        );
    }

    #[test]
    fn test_validation_invalid_fuzzy_threshold() {
        let result = ProfilerConfig::builder().fuzzy_threshold(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "max_memory_mb": 256, "duplicates": { "fuzzy_max_rows": 50 } }"#;
        let config: ProfilerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.max_memory_mb, 256);
        assert_eq!(config.chunk_size, 100_000);
        assert_eq!(config.duplicates.fuzzy_max_rows, 50);
        assert_eq!(config.duplicates.fuzzy_threshold, 0.95);
    }
}
