//! Dataset-level constraint evaluation.
//!
//! Each constraint is evaluated once over its target column. Violations are
//! recorded in the [`ConstraintResult`]; only a missing target column is an
//! error.

use crate::{CancelHandle, DataSet, DataValue};
use chrono::NaiveDate;
use dq_core::{
    ConstraintKind, ConstraintResult, ConstraintRule, OffendingValue, PipelineError, RuleSetError,
    SchemaError,
};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Returns true if `value` matches `regex` and, when given, parses with the
/// `chrono` date format.
pub(crate) fn matches_date(regex: &Regex, format: Option<&str>, value: &str) -> bool {
    regex.is_match(value)
        && format.is_none_or(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}

/// A constraint with its parameters prepared for evaluation.
#[derive(Debug, Clone)]
enum Predicate {
    NotNull,
    Unique,
    Range { min: Option<f64>, max: Option<f64> },
    InSet(HashSet<String>),
    Pattern { regex: Regex, date_format: Option<String> },
}

#[derive(Debug, Clone)]
struct CompiledConstraint {
    rule: ConstraintRule,
    predicate: Predicate,
}

/// Evaluates an ordered list of constraints against a dataset.
#[derive(Debug, Clone)]
pub struct DatasetValidator {
    constraints: Vec<CompiledConstraint>,
    sample_cap: usize,
}

impl DatasetValidator {
    /// Prepares the constraints, compiling regexes and value sets.
    ///
    /// `sample_cap` bounds the offending values kept per constraint.
    pub fn new(rules: &[ConstraintRule], sample_cap: usize) -> Result<Self, RuleSetError> {
        let constraints = rules
            .iter()
            .map(|rule| {
                let predicate = match &rule.check {
                    ConstraintKind::NotNull => Predicate::NotNull,
                    ConstraintKind::Unique => Predicate::Unique,
                    ConstraintKind::Range { min, max } => Predicate::Range {
                        min: *min,
                        max: *max,
                    },
                    ConstraintKind::InSet { values } => {
                        Predicate::InSet(values.iter().cloned().collect())
                    }
                    ConstraintKind::Pattern { regex, date_format } => Predicate::Pattern {
                        regex: Regex::new(regex).map_err(|e| RuleSetError::InvalidRegex {
                            target: rule.name.clone(),
                            error: e.to_string(),
                        })?,
                        date_format: date_format.clone(),
                    },
                };
                Ok(CompiledConstraint {
                    rule: rule.clone(),
                    predicate,
                })
            })
            .collect::<Result<Vec<_>, RuleSetError>>()?;

        Ok(Self {
            constraints,
            sample_cap,
        })
    }

    /// Number of constraints this validator evaluates.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns true if there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluates every constraint, in declaration order.
    ///
    /// All target columns are checked before anything is evaluated, so a
    /// schema problem never yields a partial result.
    pub fn validate(&self, dataset: &DataSet) -> Result<Vec<ConstraintResult>, SchemaError> {
        self.check_columns(dataset)?;
        Ok(self
            .constraints
            .iter()
            .map(|constraint| self.evaluate(constraint, dataset))
            .collect())
    }

    /// Like [`validate`](Self::validate), but stops between constraints once
    /// `cancel` is set.
    pub fn validate_until(
        &self,
        dataset: &DataSet,
        cancel: &CancelHandle,
    ) -> Result<Vec<ConstraintResult>, PipelineError> {
        self.check_columns(dataset)?;
        let mut results = Vec::with_capacity(self.constraints.len());
        for constraint in &self.constraints {
            if cancel.is_cancelled() {
                debug!("Constraint evaluation cancelled");
                return Err(PipelineError::Cancelled);
            }
            results.push(self.evaluate(constraint, dataset));
        }
        Ok(results)
    }

    fn check_columns(&self, dataset: &DataSet) -> Result<(), SchemaError> {
        for constraint in &self.constraints {
            if !dataset.has_column(&constraint.rule.column) {
                return Err(SchemaError::missing_column(
                    &constraint.rule.name,
                    &constraint.rule.column,
                ));
            }
        }

        info!(
            "Evaluating {} constraint(s) over {} row(s)",
            self.constraints.len(),
            dataset.len()
        );
        Ok(())
    }

    fn evaluate(&self, constraint: &CompiledConstraint, dataset: &DataSet) -> ConstraintResult {
        let column = constraint.rule.column.as_str();
        let mut element_count = 0;
        let mut offending = Vec::new();

        match &constraint.predicate {
            Predicate::NotNull => {
                for (row, value) in dataset.column_values(column) {
                    element_count += 1;
                    if value.is_blank() {
                        offending.push(OffendingValue {
                            row,
                            value: value.to_string(),
                        });
                    }
                }
            }
            Predicate::Unique => {
                let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
                for (row, value) in dataset.column_values(column) {
                    if value.is_null() {
                        continue;
                    }
                    element_count += 1;
                    groups.entry(value.to_string()).or_default().push(row);
                }
                for (value, rows) in groups {
                    if rows.len() > 1 {
                        offending.extend(rows.into_iter().map(|row| OffendingValue {
                            row,
                            value: value.clone(),
                        }));
                    }
                }
                offending.sort_by_key(|o| o.row);
            }
            predicate => {
                for (row, value) in dataset.column_values(column) {
                    if value.is_null() {
                        continue;
                    }
                    element_count += 1;
                    if !Self::accepts(predicate, value) {
                        offending.push(OffendingValue {
                            row,
                            value: value.to_string(),
                        });
                    }
                }
            }
        }

        let unexpected_count = offending.len();
        offending.truncate(self.sample_cap);

        debug!(
            "Constraint '{}' on '{}': {} of {} unexpected",
            constraint.rule.name, column, unexpected_count, element_count
        );

        ConstraintResult {
            name: constraint.rule.name.clone(),
            kind: constraint.rule.check.label().to_string(),
            column: column.to_string(),
            success: unexpected_count == 0,
            element_count,
            unexpected_count,
            sample: offending,
        }
    }

    /// Per-value check for the non-aggregate predicates.
    fn accepts(predicate: &Predicate, value: &DataValue) -> bool {
        match predicate {
            Predicate::Range { min, max } => match value.as_float() {
                Some(v) => min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m),
                None => false,
            },
            Predicate::InSet(values) => values.contains(&value.to_string()),
            Predicate::Pattern { regex, date_format } => {
                matches_date(regex, date_format.as_deref(), &value.to_string())
            }
            Predicate::NotNull | Predicate::Unique => true,
        }
    }
}
