//! Error types for the profiling engine.
//!
//! Only dataset-level failures surface as [`ProfilingError`]. Column-level
//! failures degrade into a stub [`ColumnProfile`](crate::types::ColumnProfile)
//! carrying an `error` field, and pair-level failures during fuzzy duplicate
//! detection are reported as [`PairError`] and skipped.
//!
//! Errors are serializable so a calling service can forward them as-is.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the profiling engine.
#[derive(Error, Debug)]
pub enum ProfilingError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// A single column could not be profiled.
    #[error("Failed to profile column '{column}': {reason}")]
    ColumnFailed { column: String, reason: String },

    /// The dataset could not be read or iterated.
    #[error("Failed to read dataset: {0}")]
    DatasetUnreadable(String),

    /// Worker pool could not be created or a worker failed.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProfilingError>,
    },
}

impl ProfilingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProfilingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnFailed { .. } => "COLUMN_FAILED",
            Self::DatasetUnreadable(_) => "DATASET_UNREADABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the failure was caused by the caller's input rather than an
    /// internal fault. A web layer maps `true` to 4xx and `false` to 5xx.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::InvalidConfig(_)
            | Self::DatasetUnreadable(_)
            | Self::Io(_) => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Serialized as `{code, message}`.
impl Serialize for ProfilingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProfilingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for profiling operations.
pub type Result<T> = std::result::Result<T, ProfilingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProfilingError::Polars(e).with_context(context))
    }
}

/// Failure while scoring one candidate pair of rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PairError {
    /// Row index outside the sampled rows.
    #[error("row index {0} is out of range")]
    RowOutOfRange(usize),

    /// No weighted column had usable values for both rows.
    #[error("rows {0} and {1} share no comparable values")]
    NoComparableValues(usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProfilingError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            ProfilingError::Internal("pool".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_is_input_error() {
        assert!(ProfilingError::DatasetUnreadable("bad csv".to_string()).is_input_error());
        assert!(!ProfilingError::Internal("pool".to_string()).is_input_error());
        assert!(
            ProfilingError::DatasetUnreadable("x".to_string())
                .with_context("loading")
                .is_input_error()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = ProfilingError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error =
            ProfilingError::ColumnNotFound("test".to_string()).with_context("During profiling");
        assert!(error.to_string().contains("During profiling"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_pair_error_display() {
        let error = PairError::NoComparableValues(3, 7);
        assert_eq!(error.to_string(), "rows 3 and 7 share no comparable values");
    }
}
