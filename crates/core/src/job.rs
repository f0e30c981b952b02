//! Job entity model for cluster-coordinated site jobs.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, MemberId, Timestamp};

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Returns `true` for statuses a job can never leave.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// A cluster-coordinated job targeting a single site.
///
/// Created when submitted, mutated by the executor as pipeline steps
/// complete, terminal once `status` is `Succeeded` or `Failed`.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    /// Job-type tag, e.g. `"site.activate"`. Also the first half of the
    /// concurrency key.
    pub job_type: String,
    /// Unique key of the site this job targets.
    pub site_uid: String,
    pub status: JobStatus,
    /// Coarse completion percentage in `0..=100`.
    pub progress_percent: u8,
    /// Member coordinating the initiator phase.
    pub coordinator: MemberId,
    /// Maximum number of jobs of this type running concurrently for the
    /// same site.
    pub parallel_limit: usize,
    pub error_message: Option<String>,
    pub submitted_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl Job {
    /// Create a pending job for `site_uid`, coordinated by `coordinator`.
    pub fn new(job_type: impl Into<String>, site_uid: impl Into<String>, coordinator: MemberId) -> Self {
        Self {
            id: uuid::Uuid::now_v7(),
            job_type: job_type.into(),
            site_uid: site_uid.into(),
            status: JobStatus::Pending,
            progress_percent: 0,
            coordinator,
            parallel_limit: 1,
            error_message: None,
            submitted_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// The key under which this job competes for a concurrency slot.
    pub fn concurrency_key(&self) -> String {
        format!("{}:{}", self.job_type, self.site_uid)
    }
}
