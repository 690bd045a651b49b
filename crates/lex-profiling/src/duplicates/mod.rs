//! Duplicate row detection.
//!
//! - [`exact`]: full-row equality over a seeded row sample, scaled up to an
//!   estimate for large frames.
//! - [`fuzzy`]: weighted per-column similarity between candidate pairs
//!   drawn from an inverted index, grouped into near-duplicate clusters.

pub mod exact;
pub mod fuzzy;
mod index;
mod similarity;

pub use exact::detect_exact_duplicates;
pub use fuzzy::detect_fuzzy_duplicates;

/// Rows read per column slice when gathering sampled rows.
pub(crate) const GATHER_CHUNK_ROWS: usize = 100_000;
