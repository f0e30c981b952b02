use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::site::Site;

/// Load/save access to site records.
///
/// These two operations are everything the job core needs from storage;
/// keeping the seam this narrow is what lets the activation job run
/// unchanged against Postgres and the in-memory store.
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Load a site by its unique key. `Ok(None)` means the site does not
    /// exist; callers decide whether that is an error.
    async fn load_by_uid(&self, uid: &str) -> Result<Option<Site>, StoreError>;

    /// Durably write a site record, replacing any existing row with the
    /// same uid.
    async fn save(&self, site: &Site) -> Result<(), StoreError>;
}
