//! Domain logic for sitegrid cluster job coordination.
//!
//! This crate holds the pure building blocks shared by the rest of the
//! workspace and has no internal dependencies:
//!
//! - [`error`] — the job error taxonomy.
//! - [`types`] — shared id and timestamp aliases.
//! - [`job`] — the [`Job`](job::Job) record and its lifecycle status.
//! - [`pipeline`] — ordered, short-circuiting execution of fallible steps.
//! - [`progress`] — per-job monotone progress accounting.
//! - [`limiter`] — per-resource bounds on concurrently running jobs.
//! - [`commands`] — cluster command name constants.

pub mod commands;
pub mod error;
pub mod job;
pub mod limiter;
pub mod pipeline;
pub mod progress;
pub mod types;

pub use error::JobError;
pub use job::{Job, JobStatus};
pub use limiter::ConcurrencyLimiter;
pub use pipeline::{JobTask, TaskPipeline, TaskResult};
pub use progress::ProgressTracker;
