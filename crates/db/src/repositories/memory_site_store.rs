//! In-memory site store for tests and single-node development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::site::Site;
use crate::repositories::site_store::SiteStore;

/// [`SiteStore`] backed by a `HashMap`. Clones on read so callers can
/// mutate records freely before saving them back.
#[derive(Default)]
pub struct MemorySiteStore {
    sites: RwLock<HashMap<String, Site>>,
}

impl MemorySiteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    pub fn with_sites(sites: impl IntoIterator<Item = Site>) -> Self {
        let map = sites.into_iter().map(|s| (s.uid.clone(), s)).collect();
        Self {
            sites: RwLock::new(map),
        }
    }
}

#[async_trait]
impl SiteStore for MemorySiteStore {
    async fn load_by_uid(&self, uid: &str) -> Result<Option<Site>, StoreError> {
        Ok(self.sites.read().await.get(uid).cloned())
    }

    async fn save(&self, site: &Site) -> Result<(), StoreError> {
        self.sites
            .write()
            .await
            .insert(site.uid.clone(), site.clone());
        Ok(())
    }
}
