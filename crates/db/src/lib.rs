//! Persistence layer for sitegrid.
//!
//! The job core depends only on the [`SiteStore`] trait — load a record by
//! its unique key, save a record — and never on the storage engine's query
//! language. Two implementations are provided:
//!
//! - [`PgSiteStore`] — the production Postgres store on `sqlx`.
//! - [`MemorySiteStore`] — an in-memory store for tests and single-node
//!   development.

pub mod error;
pub mod models;
pub mod repositories;

pub use error::StoreError;
pub use models::site::Site;
pub use repositories::memory_site_store::MemorySiteStore;
pub use repositories::pg_site_store::PgSiteStore;
pub use repositories::site_store::SiteStore;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}
