//! Main validation engine.
//!
//! [`Pipeline`] ties the loader, both validators and the aggregator together.
//! It can run sequentially ([`Pipeline::run_blocking`]) or as a fork-join
//! over tokio's blocking pool ([`Pipeline::run`]); both produce the same
//! [`Verdict`] for the same table.

use crate::{
    Aggregator, CancelHandle, DataSet, DatasetValidator, RowValidator, TableSchema, load_csv,
    load_csv_until,
};
use dq_core::{PipelineError, RowResult, RuleSet, RunContext, Verdict};
use std::future::Future;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

/// A configured validation run.
///
/// # Example
///
/// ```rust
/// use dq_core::{RuleSet, RunContext};
/// use dq_validator::{DataSet, Pipeline};
///
/// let pipeline = Pipeline::new(RuleSet::amazon_sales(), RunContext::new()).unwrap();
/// let dataset = DataSet::new(
///     dq_core::columns::ORDER_COLUMNS.iter().map(|c| c.to_string()).collect(),
///     vec![],
/// );
///
/// let verdict = pipeline.run_blocking(&dataset).unwrap();
/// assert!(verdict.overall_success);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    rules: RuleSet,
    context: RunContext,
    dataset_validator: Arc<DatasetValidator>,
    row_validator: Arc<RowValidator>,
    aggregator: Aggregator,
}

impl Pipeline {
    /// Creates a pipeline, rejecting a malformed rule set.
    pub fn new(rules: RuleSet, context: RunContext) -> Result<Self, PipelineError> {
        let problems = rules.check();
        if !problems.is_empty() {
            return Err(PipelineError::InvalidRules(problems));
        }

        let dataset_validator = DatasetValidator::new(&rules.constraints, context.sample_cap)
            .map_err(|e| PipelineError::InvalidRules(vec![e]))?;
        let row_validator = RowValidator::new(rules.row_schema.clone())
            .map_err(|e| PipelineError::InvalidRules(vec![e]))?;

        Ok(Self {
            aggregator: Aggregator::new(context.failure_sample_limit),
            dataset_validator: Arc::new(dataset_validator),
            row_validator: Arc::new(row_validator),
            rules,
            context,
        })
    }

    /// The rule set this pipeline evaluates.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The run options.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Loads an order table, requiring every column of the row model.
    pub fn load(&self, path: &Path) -> Result<DataSet, PipelineError> {
        Ok(load_csv(path, &TableSchema::ORDERS)?)
    }

    /// Validates a table sequentially on the calling thread.
    ///
    /// The wall-clock budget does not apply here.
    pub fn run_blocking(&self, dataset: &DataSet) -> Result<Verdict, PipelineError> {
        let started = Instant::now();
        let constraints = self.dataset_validator.validate(dataset)?;
        let rows = self.row_validator.validate(dataset);
        let verdict = self.aggregator.aggregate(constraints, &rows);
        info!("Validation finished in {:?}", started.elapsed());
        Ok(verdict)
    }

    /// Validates a table concurrently.
    ///
    /// Dataset constraints run in one task while rows are split into
    /// `parallelism` chunks. Fails with [`PipelineError::Timeout`] if the
    /// budget runs out first.
    pub async fn run(&self, dataset: Arc<DataSet>) -> Result<Verdict, PipelineError> {
        self.run_until(dataset, CancelHandle::new()).await
    }

    /// Like [`run`](Self::run), with a cancellation handle shared with the
    /// caller.
    ///
    /// Cancelling stops the blocking workers and fails the run with
    /// [`PipelineError::Cancelled`]. An expired budget cancels the handle
    /// too, so no worker outlives a timed-out run by more than a few rows.
    pub async fn run_until(
        &self,
        dataset: Arc<DataSet>,
        cancel: CancelHandle,
    ) -> Result<Verdict, PipelineError> {
        self.within_budget(self.fork_join(dataset, cancel.clone()), &cancel)
            .await
    }

    /// Loads and validates a CSV file. The budget covers the load as well.
    pub async fn run_csv(&self, path: &Path) -> Result<Verdict, PipelineError> {
        let cancel = CancelHandle::new();
        self.within_budget(self.load_and_run(path.to_path_buf(), cancel.clone()), &cancel)
            .await
    }

    async fn load_and_run(
        &self,
        path: PathBuf,
        cancel: CancelHandle,
    ) -> Result<Verdict, PipelineError> {
        let loader_cancel = cancel.clone();
        let dataset = tokio::task::spawn_blocking(move || {
            load_csv_until(&path, &TableSchema::ORDERS, &loader_cancel)
        })
        .await
        .map_err(task_failed)??;
        self.fork_join(Arc::new(dataset), cancel).await
    }

    async fn within_budget<F>(
        &self,
        work: F,
        cancel: &CancelHandle,
    ) -> Result<Verdict, PipelineError>
    where
        F: Future<Output = Result<Verdict, PipelineError>>,
    {
        let Some(budget) = self.context.budget else {
            return work.await;
        };
        match tokio::time::timeout(budget, work).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                warn!("Validation exceeded its budget of {:?}, cancelling", budget);
                Err(PipelineError::Timeout { budget })
            }
        }
    }

    async fn fork_join(
        &self,
        dataset: Arc<DataSet>,
        cancel: CancelHandle,
    ) -> Result<Verdict, PipelineError> {
        let started = Instant::now();
        let ranges = chunk_ranges(dataset.len(), self.context.parallelism);
        info!(
            "Validating {} row(s) with {} constraint(s) across {} row task(s)",
            dataset.len(),
            self.dataset_validator.len(),
            ranges.len()
        );

        let constraint_task = {
            let validator = Arc::clone(&self.dataset_validator);
            let dataset = Arc::clone(&dataset);
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || validator.validate_until(&dataset, &cancel))
        };

        let mut row_tasks = JoinSet::new();
        for range in ranges {
            let validator = Arc::clone(&self.row_validator);
            let dataset = Arc::clone(&dataset);
            let cancel = cancel.clone();
            row_tasks
                .spawn_blocking(move || validator.validate_range_until(&dataset, range, &cancel));
        }

        // Any early return stops the row tasks still running.
        let constraints = match constraint_task.await.map_err(task_failed) {
            Ok(Ok(constraints)) => constraints,
            Ok(Err(e)) | Err(e) => {
                cancel.cancel();
                return Err(e);
            }
        };

        let mut rows: Vec<RowResult> = Vec::with_capacity(dataset.len());
        while let Some(joined) = row_tasks.join_next().await {
            match joined.map_err(task_failed) {
                Ok(Ok(chunk)) => rows.extend(chunk),
                Ok(Err(e)) | Err(e) => {
                    cancel.cancel();
                    return Err(e);
                }
            }
        }
        rows.sort_by_key(|r| r.index);

        let verdict = self.aggregator.aggregate(constraints, &rows);
        info!("Validation finished in {:?}", started.elapsed());
        Ok(verdict)
    }
}

fn task_failed(err: JoinError) -> PipelineError {
    PipelineError::TaskFailed(err.to_string())
}

/// Splits `0..len` into at most `parts` contiguous ranges of near-equal size.
fn chunk_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let size = len.div_ceil(parts.max(1));
    let ranges: Vec<Range<usize>> = (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect();
    debug!("Row chunks: {:?}", ranges);
    ranges
}
