//! Per-job progress accounting.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::JobId;

/// Tracks a monotonically non-decreasing completion percentage per job.
///
/// Values are clamped to `0.0..=100.0`; negative deltas are ignored so a
/// misbehaving step can never move progress backwards. Entries for
/// terminal jobs are dropped with [`forget`](ProgressTracker::forget).
#[derive(Default)]
pub struct ProgressTracker {
    jobs: Mutex<HashMap<JobId, f64>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the job's progress by `delta` percentage points.
    ///
    /// Returns the new value. Unknown jobs start at 0.
    pub fn advance(&self, job_id: JobId, delta: f64) -> f64 {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let entry = jobs.entry(job_id).or_insert(0.0);
        if delta > 0.0 {
            *entry = (*entry + delta).min(100.0);
        }
        *entry
    }

    /// Current percentage for the job, 0 if never advanced.
    pub fn percent(&self, job_id: JobId) -> f64 {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.get(&job_id).copied().unwrap_or(0.0)
    }

    /// Drop the entry for a job that reached a terminal status.
    pub fn forget(&self, job_id: JobId) {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.remove(&job_id);
    }
}
