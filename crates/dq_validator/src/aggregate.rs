//! Condenses constraint and row results into a [`Verdict`].

use dq_core::{ConstraintResult, DEFAULT_FAILURE_SAMPLE_LIMIT, RowResult, Verdict, VerdictCounts};

/// Builds verdicts.
///
/// Aggregation is a pure function of its inputs: the same results always
/// give the same verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregator {
    failure_sample_limit: usize,
}

impl Aggregator {
    /// Creates an aggregator keeping at most `failure_sample_limit` failing
    /// constraints and failing rows.
    pub fn new(failure_sample_limit: usize) -> Self {
        Self {
            failure_sample_limit,
        }
    }

    /// Combines the results of one run.
    ///
    /// `rows` must be in row order; samples keep the order they are given in.
    pub fn aggregate(&self, constraints: Vec<ConstraintResult>, rows: &[RowResult]) -> Verdict {
        let constraints_passed = constraints.iter().filter(|c| c.success).count();
        let rows_valid = rows.iter().filter(|r| r.success).count();

        let counts = VerdictCounts {
            constraints_total: constraints.len(),
            constraints_passed,
            constraints_failed: constraints.len() - constraints_passed,
            rows_total: rows.len(),
            rows_valid,
            rows_invalid: rows.len() - rows_valid,
            field_errors: rows.iter().map(|r| r.errors.len()).sum(),
        };

        let constraint_failures: Vec<ConstraintResult> = constraints
            .iter()
            .filter(|c| !c.success)
            .take(self.failure_sample_limit)
            .cloned()
            .collect();
        let row_failures: Vec<RowResult> = rows
            .iter()
            .filter(|r| !r.success)
            .take(self.failure_sample_limit)
            .cloned()
            .collect();

        Verdict {
            overall_success: counts.constraints_failed == 0 && counts.rows_invalid == 0,
            omitted_constraint_failures: counts.constraints_failed - constraint_failures.len(),
            omitted_row_failures: counts.rows_invalid - row_failures.len(),
            counts,
            constraints,
            constraint_failures,
            row_failures,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_SAMPLE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dq_core::FieldError;
    use pretty_assertions::assert_eq;

    fn constraint(name: &str, success: bool) -> ConstraintResult {
        ConstraintResult {
            name: name.to_string(),
            kind: "not_null".to_string(),
            column: "order_id".to_string(),
            success,
            element_count: 10,
            unexpected_count: if success { 0 } else { 1 },
            sample: vec![],
        }
    }

    fn row(index: usize, failures: usize) -> RowResult {
        let errors = (0..failures)
            .map(|_| FieldError::new("qty", "Qty cannot be negative: -1", "-1"))
            .collect();
        RowResult::from_errors(index, errors)
    }

    #[test]
    fn test_all_passed() {
        let verdict = Aggregator::default().aggregate(
            vec![constraint("a", true), constraint("b", true)],
            &[row(0, 0), row(1, 0)],
        );

        assert!(verdict.overall_success);
        assert_eq!(verdict.counts.constraints_passed, 2);
        assert_eq!(verdict.counts.rows_valid, 2);
        assert!(verdict.constraint_failures.is_empty());
        assert!(verdict.row_failures.is_empty());
    }

    #[test]
    fn test_single_failing_row_fails_the_run() {
        let verdict =
            Aggregator::default().aggregate(vec![constraint("a", true)], &[row(0, 0), row(1, 2)]);

        assert!(!verdict.overall_success);
        assert_eq!(verdict.counts.rows_invalid, 1);
        assert_eq!(verdict.counts.field_errors, 2);
        assert_eq!(verdict.row_failures[0].index, 1);
    }

    #[test]
    fn test_single_failing_constraint_fails_the_run() {
        let verdict = Aggregator::default().aggregate(vec![constraint("a", false)], &[row(0, 0)]);
        assert!(!verdict.overall_success);
        assert_eq!(verdict.counts.constraints_failed, 1);
    }

    #[test]
    fn test_samples_are_first_k_in_order() {
        let constraints = (0..4).map(|i| constraint(&format!("c{i}"), false)).collect();
        let rows: Vec<RowResult> = (0..10).map(|i| row(i, (i % 2 == 1) as usize)).collect();

        let verdict = Aggregator::new(2).aggregate(constraints, &rows);

        let names: Vec<&str> = verdict
            .constraint_failures
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["c0", "c1"]);
        assert_eq!(verdict.omitted_constraint_failures, 2);

        let indices: Vec<usize> = verdict.row_failures.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(verdict.omitted_row_failures, 3);
        assert_eq!(verdict.constraints.len(), 4);
    }

    #[test]
    fn test_empty_inputs_pass() {
        let verdict = Aggregator::default().aggregate(vec![], &[]);
        assert!(verdict.overall_success);
        assert_eq!(verdict.counts, VerdictCounts::default());
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let rows = [row(0, 1), row(1, 0)];
        let a = Aggregator::default().aggregate(vec![constraint("a", false)], &rows);
        let b = Aggregator::default().aggregate(vec![constraint("a", false)], &rows);
        assert_eq!(a, b);
    }
}
