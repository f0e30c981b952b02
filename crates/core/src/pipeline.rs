//! Ordered execution of fallible job steps.
//!
//! A job phase (initiator or worker) is an explicit `Vec` of boxed async
//! steps. [`TaskPipeline::run`] executes them sequentially, short-circuits
//! on the first error, and reports coarse progress after each step.

use futures::future::BoxFuture;

use crate::error::JobError;

/// Outcome of a single pipeline step.
pub type TaskResult = Result<serde_json::Value, JobError>;

/// One step of a job phase. Built once, awaited once, in order.
pub type JobTask = BoxFuture<'static, TaskResult>;

/// Sequential runner for a fixed, ordered list of steps.
pub struct TaskPipeline;

impl TaskPipeline {
    /// Execute `tasks` in order.
    ///
    /// After each executed step — including a failing one — `on_progress`
    /// is invoked with a `100 / total` increment. On the first error the
    /// remaining steps are skipped and that error is returned; otherwise
    /// the step results are returned in execution order.
    pub async fn run(
        tasks: Vec<JobTask>,
        mut on_progress: impl FnMut(f64) + Send,
    ) -> Result<Vec<serde_json::Value>, JobError> {
        let total = tasks.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        let increment = 100.0 / total as f64;

        let mut results = Vec::with_capacity(total);
        for task in tasks {
            let outcome = task.await;
            on_progress(increment);
            results.push(outcome?);
        }
        Ok(results)
    }
}
