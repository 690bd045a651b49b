use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use super::GATHER_CHUNK_ROWS;
use crate::config::DuplicateConfig;
use crate::dataset::{column_names, gather_rows, row_to_json, sample_indices};
use crate::error::Result;
use crate::types::{DuplicateResult, JsonRow};
use crate::value::Value;

/// Count rows equal to an earlier row.
///
/// Frames above `config.large_dataset_rows` rows are sampled down to
/// `config.large_dataset_sample` rows; the count found in a sample is scaled
/// by `total_rows / sample_len` and marked as an estimate. Up to
/// `config.example_rows` duplicate rows are returned as JSON objects.
pub fn detect_exact_duplicates(
    df: &DataFrame,
    config: &DuplicateConfig,
) -> Result<DuplicateResult<JsonRow>> {
    let total_rows = df.height();
    if total_rows == 0 || df.width() == 0 {
        return Ok(DuplicateResult::empty());
    }

    let mut sample_len = config.exact_sample_size.min(total_rows);
    if total_rows > config.large_dataset_rows {
        sample_len = sample_len.min(config.large_dataset_sample);
    }
    let indices = sample_indices(total_rows, sample_len, config.random_seed);
    let rows = gather_rows(df, &indices, GATHER_CHUNK_ROWS)?;

    let mut seen: HashSet<&[Value]> = HashSet::with_capacity(rows.len());
    let mut duplicates = 0usize;
    let mut examples = Vec::new();
    let names = column_names(df);
    for row in &rows {
        if !seen.insert(row.as_slice()) {
            duplicates += 1;
            if examples.len() < config.example_rows {
                examples.push(row_to_json(&names, row));
            }
        }
    }

    let estimated = rows.len() < total_rows;
    let count = if estimated && !rows.is_empty() {
        (duplicates as f64 * total_rows as f64 / rows.len() as f64).round() as usize
    } else {
        duplicates
    };
    debug!(
        "Exact duplicates: {} in {} sampled rows (reported {}, estimated: {})",
        duplicates,
        rows.len(),
        count,
        estimated
    );

    Ok(DuplicateResult {
        count,
        values: examples,
        estimated,
    })
}
