/// Unique identifier of a job. Generated as UUIDv7 so ids sort by
/// submission time.
pub type JobId = uuid::Uuid;

/// Identity of a cluster member process.
pub type MemberId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
