//! Profile, duplicate and quality issue types produced by the profiler.

use serde::{Serialize, Serializer};

/// A JSON object keyed by column name, in dataset column order.
pub type JsonRow = serde_json::Map<String, serde_json::Value>;

/// Semantic type assigned to a column by type inference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Date,
    Email,
    Phone,
    Uuid,
    PostalCode,
    String,
    /// Storage type passed through untouched (e.g. `bool`, `datetime[μs]`).
    Native(String),
}

impl ColumnType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Uuid => "uuid",
            Self::PostalCode => "postal_code",
            Self::String => "string",
            Self::Native(name) => name,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Types whose validity is a regex match ratio.
    pub fn is_pattern_checked(&self) -> bool {
        matches!(
            self,
            Self::Email | Self::Phone | Self::Uuid | Self::PostalCode
        )
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// A numeric outlier value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierValue {
    pub value: f64,
    pub count: usize,
}

/// Outliers found by each detection method. The methods run independently
/// and may disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outliers {
    pub z_score: Vec<OutlierValue>,
    pub iqr: Vec<OutlierValue>,
}

/// Metrics for one column of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub column_name: String,
    pub data_type: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub missing_count: usize,
    pub unique_count: usize,
    pub frequent_values: Vec<ValueCount>,
    pub invalid_values: Vec<ValueCount>,
    pub patterns: Vec<ValueCount>,
    pub quality_score: f64,
    pub completeness: f64,
    pub uniqueness: f64,
    pub validity: f64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub mean_value: Option<f64>,
    pub median_value: Option<f64>,
    pub std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<Outliers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ColumnProfile {
    /// Stub profile for a column that could not be profiled.
    pub fn failed(column_name: impl Into<String>, total_rows: usize, error: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            data_type: ColumnType::String,
            count: 0,
            null_count: 0,
            missing_count: total_rows,
            unique_count: 0,
            frequent_values: Vec::new(),
            invalid_values: Vec::new(),
            patterns: Vec::new(),
            quality_score: 0.0,
            completeness: 0.0,
            uniqueness: 0.0,
            validity: 0.0,
            min_value: None,
            max_value: None,
            mean_value: None,
            median_value: None,
            std_dev: None,
            outliers: None,
            error: Some(error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Dataset-level summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub data_quality_score: f64,
    pub column_names: Vec<String>,
    pub exact_duplicates_count: usize,
    pub fuzzy_duplicates_count: usize,
    /// Whether the columns were profiled in chunked mode.
    pub chunked: bool,
}

/// Result of a duplicate detection run. `values` is a bounded sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateResult<T> {
    pub count: usize,
    pub values: Vec<T>,
    /// True when `count` was scaled up from a sample.
    pub estimated: bool,
}

impl<T> DuplicateResult<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            values: Vec::new(),
            estimated: false,
        }
    }
}

/// A group of rows judged to be fuzzy duplicates of each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyGroup {
    pub group_id: usize,
    pub count: usize,
    /// Representative similarity as a rounded percentage.
    pub similarity: f64,
    pub rows: Vec<JsonRow>,
}

/// A data quality problem surfaced from a finished profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityIssue {
    pub issue_type: String,
    pub severity: String,
    pub affected_columns: Vec<String>,
    pub description: String,
}

/// Everything produced by one profiling run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub summary: ProfileSummary,
    /// Column profiles in dataset column order.
    pub columns: Vec<ColumnProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_duplicates: Option<DuplicateResult<JsonRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_duplicates: Option<DuplicateResult<FuzzyGroup>>,
    pub issues: Vec<QualityIssue>,
}

impl DatasetProfile {
    /// Look up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    /// Strict JSON export with column profiles keyed by column name.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut columns = serde_json::Map::new();
        for column in &self.columns {
            columns.insert(column.column_name.clone(), serde_json::to_value(column)?);
        }

        let mut root = serde_json::Map::new();
        root.insert("summary".to_string(), serde_json::to_value(&self.summary)?);
        root.insert("columns".to_string(), serde_json::Value::Object(columns));
        if let Some(exact) = &self.exact_duplicates {
            root.insert("exact_duplicates".to_string(), serde_json::to_value(exact)?);
        }
        if let Some(fuzzy) = &self.fuzzy_duplicates {
            root.insert("fuzzy_duplicates".to_string(), serde_json::to_value(fuzzy)?);
        }
        root.insert("issues".to_string(), serde_json::to_value(&self.issues)?);
        Ok(serde_json::Value::Object(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_serializes_flat() {
        assert_eq!(
            serde_json::to_value(ColumnType::PostalCode).unwrap(),
            serde_json::json!("postal_code")
        );
        assert_eq!(
            serde_json::to_value(ColumnType::Native("bool".to_string())).unwrap(),
            serde_json::json!("bool")
        );
    }

    #[test]
    fn test_failed_profile_is_zero_quality() {
        let profile = ColumnProfile::failed("broken", 10, "boom");
        assert_eq!(profile.quality_score, 0.0);
        assert_eq!(profile.count + profile.missing_count, 10);
        assert!(profile.is_degraded());

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["error"], "boom");
        assert!(json.get("outliers").is_none());
    }

    #[test]
    fn test_to_json_keys_columns_in_order() {
        let profile = DatasetProfile {
            summary: ProfileSummary {
                total_rows: 0,
                total_columns: 2,
                data_quality_score: 0.0,
                column_names: vec!["b".to_string(), "a".to_string()],
                exact_duplicates_count: 0,
                fuzzy_duplicates_count: 0,
                chunked: false,
            },
            columns: vec![
                ColumnProfile::failed("b", 0, "x"),
                ColumnProfile::failed("a", 0, "y"),
            ],
            exact_duplicates: None,
            fuzzy_duplicates: None,
            issues: vec![],
        };

        let json = profile.to_json().unwrap();
        let keys: Vec<_> = json["columns"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
