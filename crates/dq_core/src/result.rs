//! Validation outcomes.
//!
//! Results are immutable records of what the validators observed. The
//! aggregated [`Verdict`] is the sole input to reporting.

use serde::{Deserialize, Serialize};

/// One offending value found by a dataset-level constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffendingValue {
    /// 0-based data row index
    pub row: usize,
    /// Rendered cell value (`null` for missing cells)
    pub value: String,
}

/// Outcome of one dataset-level constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResult {
    /// Constraint name
    pub name: String,
    /// Constraint kind label (`not_null`, `unique`, ...)
    pub kind: String,
    /// Target column
    pub column: String,
    /// True if no value violated the constraint
    pub success: bool,
    /// Number of values examined
    pub element_count: usize,
    /// Number of values that violated the constraint
    pub unexpected_count: usize,
    /// Offending values in row order, bounded by the sample cap
    pub sample: Vec<OffendingValue>,
}

impl ConstraintResult {
    /// Share of examined values that violated the constraint, in percent.
    pub fn unexpected_percent(&self) -> f64 {
        if self.element_count == 0 {
            0.0
        } else {
            self.unexpected_count as f64 * 100.0 / self.element_count as f64
        }
    }
}

/// A single failing field of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name of the row model
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// Raw input value
    pub value: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: value.into(),
        }
    }
}

/// Outcome of the row model applied to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResult {
    /// 0-based data row index
    pub index: usize,
    /// True if every field rule passed
    pub success: bool,
    /// Failing fields in field declaration order
    pub errors: Vec<FieldError>,
}

impl RowResult {
    /// Builds a row result; the row succeeds iff there are no errors.
    pub fn from_errors(index: usize, errors: Vec<FieldError>) -> Self {
        Self {
            index,
            success: errors.is_empty(),
            errors,
        }
    }

    /// Line number of this row in the source file (header is line 1).
    pub fn line(&self) -> usize {
        self.index + 2
    }
}

/// Tallies over all results of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    /// Constraints evaluated
    pub constraints_total: usize,
    /// Constraints that passed
    pub constraints_passed: usize,
    /// Constraints that failed
    pub constraints_failed: usize,
    /// Rows validated
    pub rows_total: usize,
    /// Rows where every field rule passed
    pub rows_valid: usize,
    /// Rows with at least one failing field
    pub rows_invalid: usize,
    /// Failing fields across all rows
    pub field_errors: usize,
}

/// The aggregated pass/fail outcome of a run plus bounded evidence.
///
/// Built once per run from immutable inputs and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// True iff every constraint and every row succeeded
    pub overall_success: bool,

    /// Tallies over all results
    pub counts: VerdictCounts,

    /// Every constraint result, in declaration order
    pub constraints: Vec<ConstraintResult>,

    /// First failing constraints, in declaration order
    pub constraint_failures: Vec<ConstraintResult>,

    /// First failing rows, in row order
    pub row_failures: Vec<RowResult>,

    /// Failing rows not included in `row_failures`
    pub omitted_row_failures: usize,

    /// Failing constraints not included in `constraint_failures`
    pub omitted_constraint_failures: usize,
}

impl Verdict {
    /// Failing constraint results, in declaration order.
    pub fn failed_constraints(&self) -> impl Iterator<Item = &ConstraintResult> {
        self.constraints.iter().filter(|c| !c.success)
    }

    /// Passing constraint results, in declaration order.
    pub fn passed_constraints(&self) -> impl Iterator<Item = &ConstraintResult> {
        self.constraints.iter().filter(|c| c.success)
    }
}
