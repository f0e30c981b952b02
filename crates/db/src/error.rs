use sitegrid_core::JobError;

/// Errors from a [`SiteStore`](crate::SiteStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Non-sqlx backends (memory store, fakes) report failures as plain
    /// messages.
    #[error("Storage failure: {0}")]
    Backend(String),
}

impl From<StoreError> for JobError {
    fn from(err: StoreError) -> Self {
        JobError::Persistence(err.to_string())
    }
}
