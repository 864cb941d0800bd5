//! Error types for data quality runs.
//!
//! Only fatal and post-validation failures live here. Ordinary rule
//! violations are data: they are recorded in [`ConstraintResult`] and
//! [`RowResult`] and never surface as an `Err`.
//!
//! [`ConstraintResult`]: crate::ConstraintResult
//! [`RowResult`]: crate::RowResult

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The input table could not be loaded.
///
/// Fatal: no validation runs and no verdict is produced.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input file does not exist
    #[error("Input file not found: {}", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Input file exists but could not be read
    #[error("Failed to read input file {}: {source}", path.display())]
    Read {
        /// Path of the input file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Content is not a well-formed delimited table
    #[error("Failed to parse input file {}: {message}", path.display())]
    Parse {
        /// Path of the input file
        path: PathBuf,
        /// Parser diagnostic, including the position when known
        message: String,
    },

    /// One or more columns required by the row model are absent
    #[error("Input file {} is missing required column(s): {}", path.display(), columns.join(", "))]
    MissingColumns {
        /// Path of the input file
        path: PathBuf,
        /// Normalized names of the missing columns
        columns: Vec<String>,
    },

    /// Loading stopped because the run was cancelled
    #[error("Loading of {} was cancelled", path.display())]
    Cancelled {
        /// Path of the input file
        path: PathBuf,
    },
}

/// A dataset-level constraint targets a column the table does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Constraint '{constraint}' references column '{column}' which is absent from the dataset")]
pub struct SchemaError {
    /// Name of the offending constraint
    pub constraint: String,
    /// Column the constraint targets
    pub column: String,
}

impl SchemaError {
    /// Creates a new schema error.
    pub fn missing_column(constraint: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            column: column.into(),
        }
    }
}

/// A rule set is not well-formed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleSetError {
    /// Rule set has no name
    #[error("Rule set name cannot be empty")]
    EmptyName,

    /// Two constraints share a name
    #[error("Duplicate constraint name '{0}'")]
    DuplicateConstraint(String),

    /// Constraint has no target column
    #[error("Constraint '{0}' has no target column")]
    EmptyColumn(String),

    /// Set membership constraint with an empty set
    #[error("Constraint '{0}' has an empty value set")]
    EmptyValueSet(String),

    /// Range with lower bound above upper bound
    #[error("Constraint '{constraint}' has an invalid range [{min}, {max}]")]
    InvalidRange {
        /// Constraint name
        constraint: String,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// Regex does not compile
    #[error("Invalid regex pattern for '{target}': {error}")]
    InvalidRegex {
        /// Constraint name or row-schema field
        target: String,
        /// Compiler diagnostic
        error: String,
    },

    /// Row schema list that must not be empty is empty
    #[error("Row schema list '{0}' cannot be empty")]
    EmptyRowSchemaList(&'static str),
}

/// The notification could not be delivered.
///
/// Non-fatal: logged, never changes the verdict or the exit signal.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request never completed (DNS, connect, TLS, timeout)
    #[error("Notification transport error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("Notification endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },
}

/// The rendered report could not be persisted.
///
/// Non-fatal: surfaced as a warning.
#[derive(Debug, Error)]
#[error("Failed to archive report to {}: {source}", path.display())]
pub struct ArchivalError {
    /// Destination that failed
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

/// Fatal outcomes of a pipeline run, all of which abort before a verdict exists.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Rule set is not well-formed
    #[error("Invalid rule set: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidRules(Vec<RuleSetError>),

    /// Input could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A constraint targets a missing column
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The run exceeded its wall-clock budget
    #[error("Validation run exceeded its time budget of {budget:?}")]
    Timeout {
        /// Budget that was exceeded
        budget: Duration,
    },

    /// A validation worker panicked or was cancelled
    #[error("Validation task failed: {0}")]
    TaskFailed(String),

    /// The run was cancelled before it produced a verdict
    #[error("Validation run was cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Returns true if this error is a budget timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PipelineError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_message() {
        let err = SchemaError::missing_column("qty_non_negative", "qty");
        assert_eq!(
            err.to_string(),
            "Constraint 'qty_non_negative' references column 'qty' which is absent from the dataset"
        );
    }

    #[test]
    fn test_missing_columns_message() {
        let err = LoadError::MissingColumns {
            path: PathBuf::from("orders.csv"),
            columns: vec!["qty".to_string(), "amount".to_string()],
        };
        assert!(err.to_string().contains("qty, amount"));
    }

    #[test]
    fn test_pipeline_error_kinds() {
        let timeout = PipelineError::Timeout {
            budget: Duration::from_secs(1),
        };
        assert!(timeout.is_timeout());

        let schema: PipelineError = SchemaError::missing_column("c", "x").into();
        assert!(!schema.is_timeout());
        assert!(schema.to_string().contains("'x'"));
    }
}
