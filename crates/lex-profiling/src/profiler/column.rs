//! Exact single-pass column profiling.

use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::accumulator::{AccumulatorLimits, ColumnAccumulator};
use super::type_inference::infer_column_type;
use crate::config::ProfilerConfig;
use crate::dataset::{evenly_spaced, series_values};
use crate::quality::QualityScorer;
use crate::types::ColumnProfile;

/// Profile a whole column in memory. The type is inferred from an evenly
/// spaced sample; every other metric is computed over all rows.
pub(crate) fn profile_column(
    series: &Series,
    config: &ProfilerConfig,
    scorer: &QualityScorer,
) -> PolarsResult<ColumnProfile> {
    let values = series_values(series)?;
    let sample = evenly_spaced(&values, config.inference_sample_rows);
    let column_type = infer_column_type(series.dtype(), &sample);

    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let acc = ColumnAccumulator::from_chunk(
        column_type,
        &values,
        &AccumulatorLimits::exact(),
        &mut rng,
    );
    Ok(acc.finish(series.name(), series.len(), config, scorer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;

    fn profile(series: Series) -> ColumnProfile {
        profile_column(&series, &ProfilerConfig::default(), &QualityScorer::default()).unwrap()
    }

    #[test]
    fn test_numeric_column_statistics() {
        let p = profile(Series::new("n".into(), &[1i64, 2, 3, 4, 5, 1000]));
        assert_eq!(p.data_type, ColumnType::Integer);
        assert_eq!(p.count, 6);
        assert_eq!(p.min_value, Some(1.0));
        assert_eq!(p.max_value, Some(1000.0));
        assert_eq!(p.median_value, Some(3.5));
        let outliers = p.outliers.unwrap();
        assert_eq!(outliers.z_score[0].value, 1000.0);
        assert_eq!(outliers.iqr[0].value, 1000.0);
        assert!(p.patterns.is_empty());
    }

    #[test]
    fn test_quality_formula() {
        let p = profile(Series::new("c".into(), &[Some("red"), Some("blue"), None, Some("red")]));
        let expected = 0.5 * p.completeness + 0.48 * p.validity + 0.02 * p.uniqueness;
        assert!((p.quality_score - expected).abs() < 1e-9);
        assert_eq!(p.unique_count, 2);
        assert_eq!(p.frequent_values[0].value, "red");
        assert_eq!(p.patterns[0].value, "AAA");
    }

    #[test]
    fn test_all_null_column_scores_low() {
        let p = profile(Series::new("x".into(), &[None::<&str>, None, None]));
        assert_eq!(p.count, 0);
        assert_eq!(p.missing_count, 3);
        assert_eq!(p.completeness, 0.0);
        assert_eq!(p.validity, 0.0);
        assert_eq!(p.quality_score, 0.0);
    }

    #[test]
    fn test_date_strings_validity() {
        let p = profile(Series::new(
            "d".into(),
            &["2023-01-01", "2023-02-15", "2023-03-30", "not a date"],
        ));
        assert_eq!(p.data_type, ColumnType::Date);
        assert!((p.validity - 0.75).abs() < 1e-12);
    }
}
