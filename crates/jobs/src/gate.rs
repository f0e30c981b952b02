//! Member-local runtime state for sites.
//!
//! Both services are explicitly injected into the jobs that mutate them —
//! never reached through globals — and are scoped to a single cluster
//! member. Thread-safe via interior `RwLock`; designed to be wrapped in
//! `Arc` and shared with the request-routing path.

use std::collections::HashSet;

use tokio::sync::RwLock;

/// The set of site uids this member believes are active in storage.
///
/// The coordinator flips an entry immediately after a successful durable
/// write, ahead of the broadcast round-trip, so local convergence does not
/// wait on command delivery.
#[derive(Default)]
pub struct ActiveSiteRegistry {
    active: RwLock<HashSet<String>>,
}

impl ActiveSiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a site active. Idempotent.
    pub async fn activate(&self, uid: &str) {
        self.active.write().await.insert(uid.to_string());
    }

    /// Mark a site inactive. Idempotent.
    pub async fn deactivate(&self, uid: &str) {
        self.active.write().await.remove(uid);
    }

    pub async fn is_active(&self, uid: &str) -> bool {
        self.active.read().await.contains(uid)
    }
}

/// Controls whether this member serves incoming requests for a site.
///
/// Written only by worker tasks on command delivery; read by the routing
/// path outside this crate.
#[derive(Default)]
pub struct TrafficGate {
    accepting: RwLock<HashSet<String>>,
}

impl TrafficGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start serving requests for a site. Idempotent: re-applying
    /// activation (re-delivery, coordinator self-delivery) is harmless.
    pub async fn start_accepting(&self, uid: &str) {
        let newly = self.accepting.write().await.insert(uid.to_string());
        if newly {
            tracing::info!(site = uid, "Traffic gate open, accepting requests");
        }
    }

    /// Stop serving requests for a site. Idempotent.
    pub async fn stop_accepting(&self, uid: &str) {
        self.accepting.write().await.remove(uid);
    }

    pub async fn is_accepting(&self, uid: &str) -> bool {
        self.accepting.read().await.contains(uid)
    }
}
