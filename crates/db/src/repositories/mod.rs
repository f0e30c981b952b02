//! Repository layer.
//!
//! [`SiteStore`](site_store::SiteStore) is the seam the job core programs
//! against; the concrete stores live beside it.

pub mod memory_site_store;
pub mod pg_site_store;
pub mod site_store;

pub use memory_site_store::MemorySiteStore;
pub use pg_site_store::PgSiteStore;
pub use site_store::SiteStore;
