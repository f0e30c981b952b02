/// Errors produced while coordinating a site job across the cluster.
///
/// Initiator-side variants (`SiteNotFound`, `Persistence`, `Broadcast`)
/// abort the pipeline and reach the job's caller. `Worker` is member-local:
/// it is logged where the traffic gate failed and never aggregated back to
/// the coordinator.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The site record does not exist at the persistence layer.
    /// Fatal to the job; no command is broadcast.
    #[error("Site not found")]
    SiteNotFound { uid: String },

    /// Loading or saving the site record failed. Fatal to the job;
    /// no command is broadcast.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Command fan-out failed after the durable write already succeeded.
    /// The job fails and the resulting storage/cluster inconsistency is
    /// logged prominently at the publish site.
    #[error("Broadcast failure: {0}")]
    Broadcast(String),

    /// A member-local worker task (traffic gate activation) failed.
    #[error("Worker task failure: {0}")]
    Worker(String),
}
