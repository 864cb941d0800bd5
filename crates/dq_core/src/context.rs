//! Run options for a validation pipeline.

use std::time::Duration;

/// Default number of offending values kept per constraint result.
pub const DEFAULT_SAMPLE_CAP: usize = 20;

/// Default number of failing constraints and failing rows kept in a verdict.
pub const DEFAULT_FAILURE_SAMPLE_LIMIT: usize = 5;

/// Options for a validation run.
///
/// Provides the bounds on report size and the execution knobs of the
/// pipeline. None of these options change which rules pass or fail.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Maximum number of offending values retained per constraint
    pub sample_cap: usize,

    /// Maximum number of failing constraints and failing rows retained in the verdict
    pub failure_sample_limit: usize,

    /// Number of concurrent row-validation tasks
    pub parallelism: usize,

    /// Wall-clock budget for the whole run
    pub budget: Option<Duration>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
            failure_sample_limit: DEFAULT_FAILURE_SAMPLE_LIMIT,
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            budget: None,
        }
    }
}

impl RunContext {
    /// Creates a new run context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-constraint sample cap.
    pub fn with_sample_cap(mut self, cap: usize) -> Self {
        self.sample_cap = cap;
        self
    }

    /// Sets how many failing constraints and rows the verdict keeps.
    pub fn with_failure_sample_limit(mut self, limit: usize) -> Self {
        self.failure_sample_limit = limit;
        self
    }

    /// Sets the number of row-validation tasks. Zero is treated as one.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }
}
