use serde::{Deserialize, Serialize};

/// Relative weight of each quality dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub completeness: f64,
    pub validity: f64,
    pub uniqueness: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            completeness: 0.5,
            validity: 0.48,
            uniqueness: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityScorer {
    weights: QualityWeights,
}

impl QualityScorer {
    pub fn new(weights: QualityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &QualityWeights {
        &self.weights
    }

    /// Weighted column score, clamped to `[0, 1]`.
    pub fn score(&self, completeness: f64, uniqueness: f64, validity: f64) -> f64 {
        let w = &self.weights;
        let score =
            w.completeness * completeness + w.validity * validity + w.uniqueness * uniqueness;
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }

    /// Unweighted mean of column scores; 0.0 when there are none.
    pub fn dataset_score(&self, column_scores: &[f64]) -> f64 {
        if column_scores.is_empty() {
            return 0.0;
        }
        column_scores.iter().sum::<f64>() / column_scores.len() as f64
    }
}
