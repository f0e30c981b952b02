//! Job lifecycle execution.
//!
//! A [`SiteJob`] produces two ordered task lists: initiator tasks, run
//! once on the coordinating member, and worker tasks, run on every member
//! when the job's command is delivered. [`JobExecutor`] drives the
//! coordinator side: concurrency gating, the initiator pipeline, progress
//! accounting, and the terminal status transition.

use std::sync::Arc;

use sitegrid_core::types::JobId;
use sitegrid_core::{ConcurrencyLimiter, Job, JobError, JobStatus, JobTask, ProgressTracker, TaskPipeline};

/// Default per-site concurrency limit for cluster-coordinated jobs.
pub const DEFAULT_PARALLEL_LIMIT: usize = 1;

/// A job variant that coordinates a state change for one site across the
/// cluster.
///
/// Implementors supply the two task phases; everything else — gating,
/// ordering, progress, status — is owned by the executor. Task lists are
/// built fresh per call and each task is awaited exactly once, in order.
pub trait SiteJob: Send + Sync {
    /// Job-type tag, e.g. `"site.activate"`.
    fn job_type(&self) -> &'static str;

    /// Unique key of the site this job targets.
    fn site_uid(&self) -> &str;

    /// How many jobs of this type may run concurrently for the same site.
    fn parallel_limit(&self) -> usize {
        DEFAULT_PARALLEL_LIMIT
    }

    /// Tasks run once, on the coordinating member: the durable mutation
    /// followed by the cluster broadcast.
    fn initiator_tasks(&self, job_id: JobId) -> Vec<JobTask>;

    /// Tasks run on every member — coordinator included — when the
    /// broadcast command is delivered. Must be idempotent.
    fn worker_tasks(&self) -> Vec<JobTask>;
}

/// Drives the coordinator side of a job's lifecycle.
///
/// Shared across job submissions; holds the member's limiter and progress
/// tracker.
pub struct JobExecutor {
    limiter: Arc<ConcurrencyLimiter>,
    progress: Arc<ProgressTracker>,
}

impl JobExecutor {
    pub fn new(limiter: Arc<ConcurrencyLimiter>, progress: Arc<ProgressTracker>) -> Self {
        Self { limiter, progress }
    }

    /// Run `runner` to completion on behalf of `job`.
    ///
    /// Waits for the job's concurrency slot, executes the initiator
    /// pipeline, and on success executes the job's own worker tasks
    /// inline — the coordinator guarantees only its own worker-phase
    /// execution; remote members converge independently via command
    /// delivery, and are never awaited here.
    ///
    /// `job` ends in a terminal status either way; the returned result
    /// mirrors it.
    pub async fn run(&self, job: &mut Job, runner: &dyn SiteJob) -> Result<(), JobError> {
        let _permit = self
            .limiter
            .acquire(&job.concurrency_key(), runner.parallel_limit())
            .await;

        job.parallel_limit = runner.parallel_limit();
        job.status = JobStatus::Running;
        job.started_at = Some(chrono::Utc::now());
        tracing::info!(job_id = %job.id, job_type = job.job_type, site = job.site_uid, "Job started");

        let progress = Arc::clone(&self.progress);
        let job_id = job.id;
        let result = TaskPipeline::run(runner.initiator_tasks(job_id), move |delta| {
            progress.advance(job_id, delta);
        })
        .await;

        job.progress_percent = self.progress.percent(job_id).round() as u8;
        self.progress.forget(job_id);

        match &result {
            Ok(_) => {
                // Inline worker phase: failure here is member-local and
                // does not change the job result.
                if let Err(e) = TaskPipeline::run(runner.worker_tasks(), |_| {}).await {
                    tracing::error!(
                        job_id = %job_id,
                        error = %e,
                        "Worker task failed on the coordinating member"
                    );
                }
                job.status = JobStatus::Succeeded;
                tracing::info!(job_id = %job_id, "Job succeeded");
            }
            Err(e) => {
                job.status = JobStatus::Failed;
                job.error_message = Some(e.to_string());
                tracing::error!(job_id = %job_id, error = %e, "Job failed");
            }
        }
        job.completed_at = Some(chrono::Utc::now());

        result.map(|_| ())
    }
}
