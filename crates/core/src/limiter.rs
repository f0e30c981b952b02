//! Per-resource bounds on concurrently running jobs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many jobs may run at once for a given concurrency key
/// (job type + site uid).
///
/// Each key is backed by its own semaphore created on first acquisition;
/// the limit observed for a key is the one supplied when the key is first
/// seen. Callers above the limit queue until a permit is released, which
/// happens when the holding job reaches a terminal status and drops its
/// permit.
#[derive(Default)]
pub struct ConcurrencyLimiter {
    slots: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl ConcurrencyLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for a slot under `key`, creating the key with `limit` permits
    /// if it does not exist yet. The returned permit releases the slot
    /// when dropped.
    pub async fn acquire(&self, key: &str, limit: usize) -> OwnedSemaphorePermit {
        let semaphore = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(
                slots
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Semaphore::new(limit.max(1)))),
            )
        };
        // The semaphore is never closed, so acquisition cannot fail.
        semaphore
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("limiter semaphores are never closed"))
    }

    /// Number of free slots currently available under `key`.
    /// A key that was never acquired reports `limit`.
    pub fn available(&self, key: &str, limit: usize) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .get(key)
            .map(|s| s.available_permits())
            .unwrap_or_else(|| limit.max(1))
    }
}
