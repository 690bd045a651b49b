use polars::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

use super::GATHER_CHUNK_ROWS;
use super::index::candidate_pairs;
use super::similarity::{ColumnKind, WeightedColumn, row_similarity};
use crate::config::DuplicateConfig;
use crate::dataset::{column_names, gather_rows, row_to_json, sample_indices};
use crate::error::Result;
use crate::types::{DuplicateResult, FuzzyGroup};
use crate::utils::{DtypeCategory, get_dtype_category, looks_like_date};
use crate::value::Value;

/// String values inspected when deciding whether a column holds dates.
const DATE_PROBE_VALUES: usize = 20;
const DATE_PROBE_RATIO: f64 = 0.8;
const DATE_WEIGHT: f64 = 0.8;
const LOW_WEIGHT: f64 = 0.2;
const INFORMATIVE_RANGE: (f64, f64) = (0.1, 0.8);
/// Columns used to build the candidate index.
const INDEXED_COLUMNS: usize = 5;
const ROWS_PER_GROUP: usize = 5;

/// Find groups of near-duplicate rows.
///
/// Rows are sampled, string and date columns weighted by how informative
/// they are, candidate pairs drawn from an inverted index over the heaviest
/// columns and scored by weighted similarity. Pairs at or above
/// `config.fuzzy_threshold` are merged into groups until
/// `config.max_groups` groups exist. The count is the number of rows beyond
/// the first in each group.
pub fn detect_fuzzy_duplicates(
    df: &DataFrame,
    config: &DuplicateConfig,
) -> Result<DuplicateResult<FuzzyGroup>> {
    let total_rows = df.height();
    if total_rows < 2 {
        return Ok(DuplicateResult::empty());
    }

    let indices = sample_indices(total_rows, config.fuzzy_max_rows, config.random_seed);
    let rows = gather_rows(df, &indices, GATHER_CHUNK_ROWS)?;

    let columns = weighted_columns(df, &rows);
    if columns.is_empty() {
        debug!("No string or date columns, skipping fuzzy duplicate detection");
        return Ok(DuplicateResult::empty());
    }

    let indexed: Vec<usize> = columns
        .iter()
        .take(INDEXED_COLUMNS)
        .map(|c| c.index)
        .collect();
    let pairs = candidate_pairs(&rows, &indexed);
    debug!(
        "Fuzzy duplicates: {} candidate pairs over {} sampled rows",
        pairs.len(),
        rows.len()
    );

    let groups = group_pairs(&rows, &pairs, &columns, config);
    let count = groups.iter().map(|g| g.members.len() - 1).sum();

    let names = column_names(df);
    let mut ranked: Vec<(usize, &Group)> = groups.iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.members.len().cmp(&a.1.members.len()).then(a.0.cmp(&b.0)));
    let values = ranked
        .into_iter()
        .take(config.reported_groups)
        .map(|(id, group)| FuzzyGroup {
            group_id: id + 1,
            count: group.members.len(),
            similarity: group.similarity_percent(),
            rows: group
                .members
                .iter()
                .take(ROWS_PER_GROUP)
                .map(|&i| row_to_json(&names, &rows[i]))
                .collect(),
        })
        .collect();

    Ok(DuplicateResult {
        count,
        values,
        estimated: rows.len() < total_rows,
    })
}

#[derive(Debug, Default)]
struct Group {
    members: BTreeSet<usize>,
    similarities: Vec<f64>,
}

impl Group {
    fn similarity_percent(&self) -> f64 {
        if self.similarities.is_empty() {
            return 0.0;
        }
        let mean = self.similarities.iter().sum::<f64>() / self.similarities.len() as f64;
        (mean * 100.0).round()
    }
}

/// Merge qualifying pairs into groups. A pair joins the group of whichever
/// row is already grouped, otherwise it starts a new one.
fn group_pairs(
    rows: &[Vec<Value>],
    pairs: &BTreeSet<(usize, usize)>,
    columns: &[WeightedColumn],
    config: &DuplicateConfig,
) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut membership: HashMap<usize, usize> = HashMap::new();

    for &(i, j) in pairs {
        if groups.len() >= config.max_groups {
            break;
        }
        let similarity = match row_similarity(rows, i, j, columns) {
            Ok(sim) => sim,
            Err(e) => {
                debug!("Skipping pair ({}, {}): {}", i, j, e);
                continue;
            }
        };
        if similarity < config.fuzzy_threshold {
            continue;
        }

        let group_idx = match membership.get(&i).or_else(|| membership.get(&j)) {
            Some(&idx) => idx,
            None => {
                groups.push(Group::default());
                groups.len() - 1
            }
        };
        let group = &mut groups[group_idx];
        group.members.insert(i);
        group.members.insert(j);
        group.similarities.push(similarity);
        membership.entry(i).or_insert(group_idx);
        membership.entry(j).or_insert(group_idx);
    }
    groups
}

/// String and date columns with their weights, heaviest first.
fn weighted_columns(df: &DataFrame, rows: &[Vec<Value>]) -> Vec<WeightedColumn> {
    let mut columns = Vec::new();
    for (index, column) in df.get_columns().iter().enumerate() {
        let values: Vec<&Value> = rows.iter().filter_map(|r| r.get(index)).collect();
        match get_dtype_category(column.dtype()) {
            DtypeCategory::Datetime => columns.push(WeightedColumn {
                index,
                kind: ColumnKind::Date,
                weight: DATE_WEIGHT,
            }),
            DtypeCategory::String => {
                if is_date_like(&values) {
                    columns.push(WeightedColumn {
                        index,
                        kind: ColumnKind::Date,
                        weight: DATE_WEIGHT,
                    });
                } else {
                    columns.push(WeightedColumn {
                        index,
                        kind: ColumnKind::Text,
                        weight: text_weight(&values, rows.len()),
                    });
                }
            }
            _ => {}
        }
    }
    columns.sort_by(|a, b| b.weight.total_cmp(&a.weight).then(a.index.cmp(&b.index)));
    columns
}

fn is_date_like(values: &[&Value]) -> bool {
    let probe: Vec<String> = values
        .iter()
        .filter_map(|v| v.as_text().map(|t| t.into_owned()))
        .take(DATE_PROBE_VALUES)
        .collect();
    if probe.is_empty() {
        return false;
    }
    let hits = probe.iter().filter(|s| looks_like_date(s)).count();
    hits as f64 / probe.len() as f64 >= DATE_PROBE_RATIO
}

/// `1 - 2|u - 0.5|` for uniqueness ratios in `[0.1, 0.8]`, a low flat
/// weight otherwise.
fn text_weight(values: &[&Value], sample_rows: usize) -> f64 {
    if sample_rows == 0 {
        return LOW_WEIGHT;
    }
    let distinct: HashSet<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();
    let ratio = distinct.len() as f64 / sample_rows as f64;
    let (low, high) = INFORMATIVE_RANGE;
    if (low..=high).contains(&ratio) {
        1.0 - 2.0 * (ratio - 0.5).abs()
    } else {
        LOW_WEIGHT
    }
}
