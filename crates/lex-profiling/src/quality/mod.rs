//! Data quality scoring and issue detection.
//!
//! [`QualityScorer`] folds completeness, validity and uniqueness into one
//! score per column and averages those into the dataset score.
//! [`identify_issues`] turns a finished profile into a list of
//! human-readable findings.

mod issues;
mod scorer;

pub use issues::identify_issues;
pub use scorer::{QualityScorer, QualityWeights};
