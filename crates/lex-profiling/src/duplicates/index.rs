//! Inverted index used to pick candidate pairs for fuzzy matching.

use std::collections::{BTreeSet, HashMap};

use crate::utils::is_blank;
use crate::value::Value;

const KEY_CHARS: usize = 3;

/// Lowercased bucket keys for one value: the first three characters, the
/// last three when longer than five, the middle three when longer than ten.
pub(crate) fn index_keys(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.trim().to_lowercase().chars().collect();
    let len = chars.len();
    if len == 0 {
        return Vec::new();
    }
    let take = |start: usize| -> String {
        chars[start..(start + KEY_CHARS).min(len)].iter().collect()
    };

    let mut keys = vec![take(0)];
    if len > 5 {
        keys.push(take(len - KEY_CHARS));
    }
    if len > 10 {
        keys.push(take(len / 2 - 1));
    }
    keys.sort();
    keys.dedup();
    keys
}

/// Row pairs `(i, j)` with `i < j` sharing at least one bucket in any of
/// `columns`, in ascending order.
pub(crate) fn candidate_pairs(rows: &[Vec<Value>], columns: &[usize]) -> BTreeSet<(usize, usize)> {
    let mut buckets: HashMap<(usize, String), Vec<usize>> = HashMap::new();
    for (row_idx, row) in rows.iter().enumerate() {
        for &col in columns {
            let Some(text) = row.get(col).and_then(|v| v.as_text()) else {
                continue;
            };
            if is_blank(&text) {
                continue;
            }
            for key in index_keys(&text) {
                buckets.entry((col, key)).or_default().push(row_idx);
            }
        }
    }

    let mut pairs = BTreeSet::new();
    for members in buckets.values() {
        for (pos, &i) in members.iter().enumerate() {
            for &j in &members[pos + 1..] {
                if i != j {
                    pairs.insert((i.min(j), i.max(j)));
                }
            }
        }
    }
    pairs
}
