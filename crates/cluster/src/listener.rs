//! Per-member command delivery loop.
//!
//! [`CommandListener`] subscribes to the [`CommandBus`](crate::bus::CommandBus)
//! broadcast channel and dispatches every received [`ClusterCommand`] to the
//! handler registered under its name. It runs as a long-lived background
//! task on every cluster member and shuts down gracefully when the bus
//! sender is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sitegrid_core::JobError;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::bus::ClusterCommand;

/// Worker-side reaction to a delivered command.
///
/// Handler failures are member-local: they are logged here and never
/// propagated back to the coordinating member.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: ClusterCommand) -> Result<(), JobError>;
}

/// Dispatches delivered commands to registered handlers on one member.
#[derive(Default)]
pub struct CommandListener {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for commands published under `name`, replacing
    /// any previous registration for that name.
    pub fn on_command(&mut self, name: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Run the delivery loop.
    ///
    /// Receives commands until the channel is closed (i.e. the bus is
    /// dropped). Unknown command names are logged at debug level and
    /// dropped; handler errors are logged and do not stop the loop.
    pub async fn run(self, mut receiver: broadcast::Receiver<ClusterCommand>) {
        loop {
            match receiver.recv().await {
                Ok(command) => self.dispatch(command).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Command listener lagged, some commands were not applied"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Command bus closed, listener shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn the delivery loop as a background task.
    pub fn spawn(self, receiver: broadcast::Receiver<ClusterCommand>) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver))
    }

    async fn dispatch(&self, command: ClusterCommand) {
        let Some(handler) = self.handlers.get(&command.name) else {
            tracing::debug!(command = %command.name, "No handler registered, dropping command");
            return;
        };

        let name = command.name.clone();
        let job_id = command.job_id;
        if let Err(e) = handler.handle(command).await {
            // Member-local failure; the coordinator is not told.
            tracing::error!(
                command = %name,
                job_id = %job_id,
                error = %e,
                "Command handler failed on this member"
            );
        }
    }
}
