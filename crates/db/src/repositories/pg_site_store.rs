//! Postgres-backed site store.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::site::Site;
use crate::repositories::site_store::SiteStore;

/// Column list for `sites` queries.
const COLUMNS: &str = "uid, display_name, hostname, active, created_at, updated_at";

/// Production [`SiteStore`] on top of a `PgPool`.
pub struct PgSiteStore {
    pool: PgPool,
}

impl PgSiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteStore for PgSiteStore {
    async fn load_by_uid(&self, uid: &str) -> Result<Option<Site>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE uid = $1");
        let site = sqlx::query_as::<_, Site>(&query)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    async fn save(&self, site: &Site) -> Result<(), StoreError> {
        // Upsert on uid; updated_at is always refreshed on write.
        sqlx::query(
            "INSERT INTO sites (uid, display_name, hostname, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             ON CONFLICT (uid) DO UPDATE SET \
                 display_name = EXCLUDED.display_name, \
                 hostname = EXCLUDED.hostname, \
                 active = EXCLUDED.active, \
                 updated_at = NOW()",
        )
        .bind(&site.uid)
        .bind(&site.display_name)
        .bind(&site.hostname)
        .bind(site.active)
        .bind(site.created_at)
        .execute(&self.pool)
        .await?;
        tracing::debug!(uid = %site.uid, active = site.active, "Saved site record");
        Ok(())
    }
}
