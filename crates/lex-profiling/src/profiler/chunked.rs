//! Chunked, column-parallel profiling for frames too large to profile in
//! one pass.
//!
//! Every column runs as one task on a private rayon pool. A task walks its
//! column in fixed-size row slices, folding a per-slice accumulator into the
//! column's running one, so at most one slice of values is live per task.

use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, warn};

use super::accumulator::{AccumulatorLimits, ColumnAccumulator};
use super::type_inference::infer_column_type;
use crate::config::ProfilerConfig;
use crate::dataset::{evenly_spaced, slice_values};
use crate::error::{ProfilingError, Result};
use crate::quality::QualityScorer;
use crate::types::ColumnProfile;

/// Profile all columns of `df` on a pool of `config.worker_threads`
/// threads. Profiles come back in column order; a column that fails is
/// returned as a degraded stub.
pub(crate) fn profile_columns_chunked(
    df: &DataFrame,
    config: &ProfilerConfig,
    scorer: &QualityScorer,
) -> Result<Vec<ColumnProfile>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .thread_name(|i| format!("lex-profiling-{i}"))
        .build()
        .map_err(|e| ProfilingError::Internal(format!("failed to build worker pool: {e}")))?;

    let total_rows = df.height();
    let columns = df.get_columns();
    let mut profiles: Vec<(usize, ColumnProfile)> = pool.install(|| {
        columns
            .par_iter()
            .enumerate()
            .map(|(index, column)| {
                let series = column.as_materialized_series();
                let seed = config.random_seed.wrapping_add(index as u64);
                let profile = profile_column_chunked(series, config, scorer, seed)
                    .unwrap_or_else(|e| {
                        warn!("Failed to profile column '{}': {}", series.name(), e);
                        ColumnProfile::failed(series.name().as_str(), total_rows, e.to_string())
                    });
                (index, profile)
            })
            .collect()
    });

    profiles.sort_by_key(|(index, _)| *index);
    Ok(profiles.into_iter().map(|(_, profile)| profile).collect())
}

/// Profile one column slice by slice. The type is inferred from the first
/// slice.
pub(crate) fn profile_column_chunked(
    series: &Series,
    config: &ProfilerConfig,
    scorer: &QualityScorer,
    seed: u64,
) -> PolarsResult<ColumnProfile> {
    let started = Instant::now();
    let total_rows = series.len();
    let chunk_size = config.chunk_size.max(1);
    let limits = AccumulatorLimits::chunked(config);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut acc: Option<ColumnAccumulator> = None;
    let mut offset = 0;
    let mut chunks = 0;
    while offset < total_rows {
        let len = chunk_size.min(total_rows - offset);
        let values = slice_values(series, offset, len)?;

        let running = acc.get_or_insert_with(|| {
            let sample = evenly_spaced(&values, config.inference_sample_rows);
            ColumnAccumulator::new(infer_column_type(series.dtype(), &sample))
        });
        let part = ColumnAccumulator::from_chunk(
            running.column_type().clone(),
            &values,
            &limits,
            &mut rng,
        );
        running.merge(part, &limits, &mut rng);

        offset += len;
        chunks += 1;
    }

    let acc = acc.unwrap_or_else(|| {
        ColumnAccumulator::new(infer_column_type(series.dtype(), &[]))
    });
    let rows = acc.rows();
    let profile = acc.finish(series.name(), total_rows, config, scorer);
    debug!(
        "Profiled '{}': {} rows in {} chunks ({:.1?}), buffers released",
        series.name(),
        rows,
        chunks,
        started.elapsed()
    );
    Ok(profile)
}
