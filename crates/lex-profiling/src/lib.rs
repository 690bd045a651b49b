//! Statistical Data Profiling Library
//!
//! A data profiling engine built with Rust and Polars.
//!
//! # Overview
//!
//! Given a tabular dataset this library computes, per column and in
//! aggregate:
//!
//! - **Type Inference**: integer, float, date, email, phone, uuid, postal
//!   code or string, from the storage type and a sample of values
//! - **Quality Metrics**: completeness, uniqueness and validity combined
//!   into a weighted quality score
//! - **Statistics**: min, max, mean, median, standard deviation, frequent
//!   values and character-shape patterns
//! - **Outliers**: Z-score and IQR detection, reported independently
//! - **Duplicates**: sampled exact duplicate counts and weighted fuzzy
//!   duplicate groups
//! - **Chunked Execution**: frames larger than the memory budget are
//!   profiled column-parallel in fixed-size row chunks
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_profiling::{DataProfiler, ProfilerConfig};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//!
//! // Option 1: defaults (1000 MB budget, 100,000-row chunks)
//! let profile = lex_profiling::profile(&df, 1000, 100_000)?;
//!
//! // Option 2: full configuration
//! let config = ProfilerConfig::builder()
//!     .max_memory_mb(256)
//!     .fuzzy_threshold(0.9)
//!     .build()?;
//! let profile = DataProfiler::new(&df, config)?.profile()?;
//!
//! println!("Quality: {:.3}", profile.summary.data_quality_score);
//! println!("{}", serde_json::to_string_pretty(&profile.to_json()?)?);
//! ```
//!
//! # Duplicate Detection
//!
//! Both detectors can also be called on their own:
//!
//! ```rust,ignore
//! let exact = lex_profiling::detect_exact_duplicates(&df, 100_000)?;
//! let fuzzy = lex_profiling::detect_fuzzy_duplicates(&df, 0.95, 1000)?;
//! println!("{} exact, {} near-duplicate rows", exact.count, fuzzy.count);
//! ```
//!
//! Exact counts on frames over 10,000 rows come from a 1,000-row sample and
//! are flagged as `estimated`.

pub mod config;
pub mod dataset;
pub mod duplicates;
pub mod error;
pub mod profiler;
pub mod quality;
pub mod types;
pub mod utils;
pub mod value;

use polars::prelude::DataFrame;

// Re-exports for convenient access
pub use config::{ConfigValidationError, DuplicateConfig, ProfilerConfig, ProfilerConfigBuilder};
pub use error::{PairError, ProfilingError, Result, ResultExt};
pub use profiler::DataProfiler;
pub use quality::{QualityScorer, QualityWeights, identify_issues};
pub use types::{
    ColumnProfile, ColumnType, DatasetProfile, DuplicateResult, FuzzyGroup, JsonRow, OutlierValue,
    Outliers, ProfileSummary, QualityIssue, ValueCount,
};
pub use value::Value;

/// Profile `df` with a memory budget and chunk size, defaults elsewhere.
pub fn profile(df: &DataFrame, max_memory_mb: usize, chunk_size: usize) -> Result<DatasetProfile> {
    let config = ProfilerConfig::builder()
        .max_memory_mb(max_memory_mb)
        .chunk_size(chunk_size)
        .build()?;
    DataProfiler::new(df, config)?.profile()
}

/// Count exact duplicate rows, inspecting at most `sample_size` rows.
pub fn detect_exact_duplicates(
    df: &DataFrame,
    sample_size: usize,
) -> Result<DuplicateResult<JsonRow>> {
    let config = DuplicateConfig {
        exact_sample_size: sample_size,
        ..DuplicateConfig::default()
    };
    config.validate()?;
    duplicates::detect_exact_duplicates(df, &config).context("Exact duplicate detection failed")
}

/// Group near-duplicate rows among at most `max_rows` sampled rows.
pub fn detect_fuzzy_duplicates(
    df: &DataFrame,
    threshold: f64,
    max_rows: usize,
) -> Result<DuplicateResult<FuzzyGroup>> {
    let config = DuplicateConfig {
        fuzzy_threshold: threshold,
        fuzzy_max_rows: max_rows,
        ..DuplicateConfig::default()
    };
    config.validate()?;
    duplicates::detect_fuzzy_duplicates(df, &config).context("Fuzzy duplicate detection failed")
}
