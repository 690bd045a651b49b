use crate::types::{ColumnProfile, DatasetProfile, QualityIssue};

/// Missing share above which a column is reported.
const MISSING_REPORT_RATIO: f64 = 0.10;
/// Missing share above which the report is high severity.
const MISSING_HIGH_RATIO: f64 = 0.30;
/// Validity below which a pattern-checked column is reported.
const INVALID_REPORT_VALIDITY: f64 = 0.9;

/// Collect the quality problems visible in a finished profile.
pub fn identify_issues(profile: &DatasetProfile) -> Vec<QualityIssue> {
    let total_rows = profile.summary.total_rows;
    let mut issues = Vec::new();

    for column in &profile.columns {
        if column.is_degraded() {
            issues.push(QualityIssue {
                issue_type: "profiling_failed".to_string(),
                severity: "high".to_string(),
                affected_columns: vec![column.column_name.clone()],
                description: format!(
                    "Column '{}' could not be profiled: {}",
                    column.column_name,
                    column.error.as_deref().unwrap_or("unknown error")
                ),
            });
            continue;
        }

        if let Some(issue) = missing_values_issue(column, total_rows) {
            issues.push(issue);
        }
        if let Some(issue) = invalid_values_issue(column) {
            issues.push(issue);
        }
    }

    if let Some(issue) = outliers_issue(&profile.columns) {
        issues.push(issue);
    }

    let exact = profile.summary.exact_duplicates_count;
    if exact > 0 {
        let estimated = profile
            .exact_duplicates
            .as_ref()
            .is_some_and(|d| d.estimated);
        issues.push(QualityIssue {
            issue_type: "duplicate_rows".to_string(),
            severity: "medium".to_string(),
            affected_columns: profile.summary.column_names.clone(),
            description: format!(
                "{}{} duplicate rows found",
                if estimated { "About " } else { "" },
                exact
            ),
        });
    }

    let fuzzy = profile.summary.fuzzy_duplicates_count;
    if fuzzy > 0 {
        issues.push(QualityIssue {
            issue_type: "near_duplicate_rows".to_string(),
            severity: "low".to_string(),
            affected_columns: profile.summary.column_names.clone(),
            description: format!("{fuzzy} rows look like near-duplicates of other rows"),
        });
    }

    issues
}

fn missing_values_issue(column: &ColumnProfile, total_rows: usize) -> Option<QualityIssue> {
    if total_rows == 0 {
        return None;
    }
    let ratio = column.missing_count as f64 / total_rows as f64;
    if ratio <= MISSING_REPORT_RATIO {
        return None;
    }
    let severity = if ratio > MISSING_HIGH_RATIO {
        "high"
    } else {
        "medium"
    };
    Some(QualityIssue {
        issue_type: "missing_values".to_string(),
        severity: severity.to_string(),
        affected_columns: vec![column.column_name.clone()],
        description: format!(
            "Column '{}' has {} missing values ({:.1}%)",
            column.column_name,
            column.missing_count,
            ratio * 100.0
        ),
    })
}

fn invalid_values_issue(column: &ColumnProfile) -> Option<QualityIssue> {
    if !column.data_type.is_pattern_checked()
        || column.invalid_values.is_empty()
        || column.validity >= INVALID_REPORT_VALIDITY
    {
        return None;
    }
    let examples: Vec<&str> = column
        .invalid_values
        .iter()
        .map(|v| v.value.as_str())
        .collect();
    Some(QualityIssue {
        issue_type: "invalid_values".to_string(),
        severity: "medium".to_string(),
        affected_columns: vec![column.column_name.clone()],
        description: format!(
            "Column '{}' looks like {} but only {:.1}% of values are valid, e.g. {}",
            column.column_name,
            column.data_type,
            column.validity * 100.0,
            examples.join(", ")
        ),
    })
}

fn outliers_issue(columns: &[ColumnProfile]) -> Option<QualityIssue> {
    let mut parts = Vec::new();
    let mut affected = Vec::new();
    for column in columns {
        let Some(outliers) = &column.outliers else {
            continue;
        };
        if outliers.iqr.is_empty() && outliers.z_score.is_empty() {
            continue;
        }
        let values: Vec<String> = outliers
            .iqr
            .iter()
            .chain(&outliers.z_score)
            .map(|o| o.value.to_string())
            .collect();
        parts.push(format!("'{}': {}", column.column_name, values.join(", ")));
        affected.push(column.column_name.clone());
    }
    if affected.is_empty() {
        return None;
    }
    Some(QualityIssue {
        issue_type: "outliers_detected".to_string(),
        severity: "medium".to_string(),
        affected_columns: affected,
        description: format!(
            "Outliers detected in {} numeric columns ({})",
            parts.len(),
            parts.join("; ")
        ),
    })
}
