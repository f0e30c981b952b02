//! Site entity model.

use serde::{Deserialize, Serialize};
use sitegrid_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `sites` table.
///
/// The job core only reads-modifies-writes the `active` flag; the other
/// fields belong to the site management surface.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Site {
    /// Unique site key, e.g. `"site-42"`. Primary key.
    pub uid: String,
    pub display_name: String,
    pub hostname: String,
    /// Whether the site should be served cluster-wide. Flipped to `true`
    /// by the activation job before the cluster is told to converge.
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Site {
    /// Create an inactive site record.
    pub fn new(
        uid: impl Into<String>,
        display_name: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            hostname: hostname.into(),
            active: false,
            created_at: now,
            updated_at: now,
        }
    }
}
