//! Broadcast hub backed by a `tokio::sync::broadcast` channel.
//!
//! [`CommandBus`] is the fan-out half of cluster coordination: whatever a
//! member publishes is handed to every subscribed member, including the
//! publisher itself. It is designed to be shared via `Arc<CommandBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitegrid_core::types::{JobId, MemberId};
use sitegrid_core::JobError;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ClusterCommand
// ---------------------------------------------------------------------------

/// A command addressed to every cluster member.
///
/// Transient — never persisted. Delivery is at-least-once and unordered
/// across members; handlers must tolerate re-delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterCommand {
    /// Wire name, e.g. `"activate_site"`.
    pub name: String,

    /// Job that emitted the command.
    pub job_id: JobId,

    /// Member that published the command.
    pub origin: MemberId,

    /// Free-form JSON payload carrying command-specific data.
    pub payload: serde_json::Value,

    /// When the command was published (UTC).
    pub sent_at: DateTime<Utc>,
}

impl ClusterCommand {
    /// Create a command with an empty payload.
    pub fn new(name: impl Into<String>, job_id: JobId, origin: MemberId) -> Self {
        Self {
            name: name.into(),
            job_id,
            origin,
            payload: serde_json::Value::Object(Default::default()),
            sent_at: Utc::now(),
        }
    }

    /// Set the JSON payload for the command.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// CommandBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// At-least-once command fan-out to all currently subscribed members.
///
/// Publishing is fire-and-forget: there is no acknowledgement wait and no
/// retry. The one failure the publisher does observe is a bus with zero
/// subscribers — a member is always subscribed to itself, so that means
/// the bus is broken and the error must not be swallowed.
pub struct CommandBus {
    sender: broadcast::Sender<ClusterCommand>,
}

impl CommandBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed commands are dropped
    /// and slow members will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a command to every subscribed member, returning how many
    /// members it was handed to.
    pub fn publish(&self, command: ClusterCommand) -> Result<usize, JobError> {
        let name = command.name.clone();
        match self.sender.send(command) {
            Ok(receivers) => {
                tracing::debug!(command = %name, members = receivers, "Broadcast command");
                Ok(receivers)
            }
            Err(_) => Err(JobError::Broadcast(format!(
                "no cluster members subscribed for command '{name}'"
            ))),
        }
    }

    /// Subscribe to all commands published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ClusterCommand> {
        self.sender.subscribe()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
