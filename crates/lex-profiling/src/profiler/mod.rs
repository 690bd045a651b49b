//! Data profiling module for dataset analysis.
//!
//! This module provides functionality for profiling datasets, including:
//! - Type inference for columns
//! - Completeness, uniqueness and validity metrics
//! - Numeric statistics and outlier detection
//! - Chunked, column-parallel execution for large frames

mod accumulator;
mod chunked;
mod column;
mod statistics;
mod type_inference;
mod validity;

use polars::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::ProfilerConfig;
use crate::duplicates;
use crate::error::{ProfilingError, Result, ResultExt};
use crate::quality::{QualityScorer, identify_issues};
use crate::types::{ColumnProfile, DatasetProfile, DuplicateResult, FuzzyGroup, JsonRow, ProfileSummary};

/// Profiler over one borrowed `DataFrame`.
///
/// The execution mode is fixed at construction: frames whose estimated
/// in-memory size exceeds half of `max_memory_mb` are profiled in chunks on
/// a worker pool, everything else is profiled exactly in one pass.
#[derive(Debug)]
pub struct DataProfiler<'a> {
    df: &'a DataFrame,
    config: ProfilerConfig,
    scorer: QualityScorer,
    chunked: bool,
}

static_assertions::assert_impl_all!(DataProfiler<'static>: Send, Sync);

impl<'a> DataProfiler<'a> {
    /// Create a profiler for `df`.
    ///
    /// # Errors
    ///
    /// Returns `ProfilingError::InvalidConfig` if `config` fails validation.
    pub fn new(df: &'a DataFrame, config: ProfilerConfig) -> Result<Self> {
        config.validate()?;
        let estimated = df.estimated_size();
        let threshold = config.chunking_threshold_bytes();
        let chunked = estimated > threshold;
        info!(
            "Dataset {}x{} estimated at {} bytes (threshold {}), {} mode",
            df.height(),
            df.width(),
            estimated,
            threshold,
            if chunked { "chunked" } else { "exact" }
        );
        Ok(Self {
            df,
            config,
            scorer: QualityScorer::default(),
            chunked,
        })
    }

    /// Replace the quality scorer.
    pub fn with_scorer(mut self, scorer: QualityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Whether columns will be profiled in chunked mode.
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// Profile every column, optionally detect duplicates, score the
    /// dataset and collect quality issues.
    ///
    /// # Errors
    ///
    /// Returns `ProfilingError::DatasetUnreadable` when the frame has rows
    /// but none of its columns can be read.
    pub fn profile(&self) -> Result<DatasetProfile> {
        let start_time = Instant::now();
        info!("Profiling {} columns...", self.df.width());

        let columns = self.profile_columns()?;
        let unreadable = !columns.is_empty() && columns.iter().all(|c| c.is_degraded());
        if unreadable && self.df.height() > 0 {
            return Err(ProfilingError::DatasetUnreadable(format!(
                "none of the {} columns could be read",
                columns.len()
            )));
        }

        let (exact_duplicates, fuzzy_duplicates) = if self.config.detect_duplicates {
            (
                Some(self.detect_exact_duplicates()?),
                Some(self.detect_fuzzy_duplicates()?),
            )
        } else {
            (None, None)
        };

        let scores: Vec<f64> = columns.iter().map(|c| c.quality_score).collect();
        let summary = ProfileSummary {
            total_rows: self.df.height(),
            total_columns: self.df.width(),
            data_quality_score: self.scorer.dataset_score(&scores),
            column_names: crate::dataset::column_names(self.df),
            exact_duplicates_count: exact_duplicates.as_ref().map_or(0, |d| d.count),
            fuzzy_duplicates_count: fuzzy_duplicates.as_ref().map_or(0, |d| d.count),
            chunked: self.chunked,
        };

        let mut profile = DatasetProfile {
            summary,
            columns,
            exact_duplicates,
            fuzzy_duplicates,
            issues: Vec::new(),
        };
        profile.issues = identify_issues(&profile);

        info!(
            "Profiling completed in {:.2?}: quality {:.3}, {} issues",
            start_time.elapsed(),
            profile.summary.data_quality_score,
            profile.issues.len()
        );
        Ok(profile)
    }

    /// Column profiles in column order. Columns that fail are returned as
    /// degraded stubs.
    pub fn profile_columns(&self) -> Result<Vec<ColumnProfile>> {
        if self.chunked {
            return chunked::profile_columns_chunked(self.df, &self.config, &self.scorer);
        }

        let total_rows = self.df.height();
        let profiles = self
            .df
            .get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series();
                column::profile_column(series, &self.config, &self.scorer).unwrap_or_else(|e| {
                    warn!("Failed to profile column '{}': {}", series.name(), e);
                    ColumnProfile::failed(series.name().as_str(), total_rows, e.to_string())
                })
            })
            .collect();
        Ok(profiles)
    }

    /// Profile a single column by name.
    pub fn profile_column(&self, name: &str) -> Result<ColumnProfile> {
        let column = self
            .df
            .column(name)
            .map_err(|_| ProfilingError::ColumnNotFound(name.to_string()))?;
        let series = column.as_materialized_series();
        let profile = if self.chunked {
            chunked::profile_column_chunked(series, &self.config, &self.scorer, self.config.random_seed)
        } else {
            column::profile_column(series, &self.config, &self.scorer)
        };
        profile.map_err(|e| ProfilingError::ColumnFailed {
            column: name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn detect_exact_duplicates(&self) -> Result<DuplicateResult<JsonRow>> {
        duplicates::detect_exact_duplicates(self.df, &self.config.duplicates)
            .context("Exact duplicate detection failed")
    }

    pub fn detect_fuzzy_duplicates(&self) -> Result<DuplicateResult<FuzzyGroup>> {
        duplicates::detect_fuzzy_duplicates(self.df, &self.config.duplicates)
            .context("Fuzzy duplicate detection failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;

    fn sample_df() -> DataFrame {
        df![
            "id" => [1i64, 2, 3, 4, 5, 6],
            "email" => ["a@x.com", "b@x.com", "c@x.com", "bad", "e@x.com", "f@x.com"],
            "amount" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 1000.0]
        ]
        .unwrap()
    }

    #[test]
    fn test_small_frame_is_exact() {
        let df = sample_df();
        let profiler = DataProfiler::new(&df, ProfilerConfig::default()).unwrap();
        assert!(!profiler.is_chunked());

        let profile = profiler.profile().unwrap();
        assert_eq!(profile.columns.len(), 3);
        assert_eq!(profile.summary.total_rows, 6);
        assert_eq!(profile.column("email").unwrap().data_type, ColumnType::Email);
        assert_eq!(profile.summary.exact_duplicates_count, 0);
        assert!(profile.issues.iter().any(|i| i.issue_type == "outliers_detected"));
    }

    #[test]
    fn test_zero_budget_forces_chunked_mode() {
        let df = sample_df();
        let config = ProfilerConfig::builder().max_memory_mb(0).build().unwrap();
        let profiler = DataProfiler::new(&df, config).unwrap();
        assert!(profiler.is_chunked());

        let profile = profiler.profile().unwrap();
        assert!(profile.summary.chunked);
        let names: Vec<&str> = profile.columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "amount"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let df = sample_df();
        let config = ProfilerConfig {
            chunk_size: 0,
            ..ProfilerConfig::default()
        };
        let err = DataProfiler::new(&df, config).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_profile_column_by_name() {
        let df = sample_df();
        let profiler = DataProfiler::new(&df, ProfilerConfig::default()).unwrap();
        assert_eq!(profiler.profile_column("amount").unwrap().data_type, ColumnType::Float);
        assert!(matches!(
            profiler.profile_column("missing"),
            Err(ProfilingError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_duplicates_disabled() {
        let df = sample_df();
        let config = ProfilerConfig::builder().detect_duplicates(false).build().unwrap();
        let profile = DataProfiler::new(&df, config).unwrap().profile().unwrap();
        assert!(profile.exact_duplicates.is_none());
        assert!(profile.fuzzy_duplicates.is_none());
    }

    #[test]
    fn test_empty_frame() {
        let df = DataFrame::empty();
        let profile = DataProfiler::new(&df, ProfilerConfig::default())
            .unwrap()
            .profile()
            .unwrap();
        assert!(profile.columns.is_empty());
        assert_eq!(profile.summary.data_quality_score, 0.0);
    }

    fn tags_column(rows: usize) -> Column {
        let items: Vec<Series> = (0..rows)
            .map(|i| Series::new("".into(), &[i as i64, 7]))
            .collect();
        Series::new("tags".into(), items).into_column()
    }

    #[test]
    fn test_unreadable_column_degrades_with_duplicates_enabled() {
        let df = DataFrame::new(vec![
            Series::new("name".into(), &["Ana", "Ben", "Ana", "Cleo"]).into_column(),
            tags_column(4),
            Series::new("score".into(), &[1.0f64, 2.0, 1.0, 3.0]).into_column(),
        ])
        .unwrap();

        let profile = DataProfiler::new(&df, ProfilerConfig::default())
            .unwrap()
            .profile()
            .unwrap();

        let names: Vec<&str> = profile.columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["name", "tags", "score"]);

        let tags = profile.column("tags").unwrap();
        assert_eq!(tags.quality_score, 0.0);
        assert!(tags.error.is_some());
        assert!(profile.column("name").unwrap().error.is_none());
        assert_eq!(profile.column("score").unwrap().data_type, ColumnType::Float);
        assert!(profile.exact_duplicates.is_some());
        assert!(profile.fuzzy_duplicates.is_some());
        assert!(profile.issues.iter().any(|i| i.issue_type == "profiling_failed"));
    }

    #[test]
    fn test_frame_without_readable_columns_fails() {
        let df = DataFrame::new(vec![tags_column(3)]).unwrap();
        for detect in [true, false] {
            let config = ProfilerConfig::builder().detect_duplicates(detect).build().unwrap();
            let err = DataProfiler::new(&df, config).unwrap().profile().unwrap_err();
            assert!(matches!(err, ProfilingError::DatasetUnreadable(_)));
            assert_eq!(err.error_code(), "DATASET_UNREADABLE");
        }
    }
}
