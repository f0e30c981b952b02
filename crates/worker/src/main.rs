//! Cluster-member entrypoint: subscribes to the command bus and applies
//! worker-phase effects (traffic gating) for this member.

use std::sync::Arc;

use sitegrid_cluster::{CommandBus, CommandHandler, CommandListener};
use sitegrid_core::commands::CMD_ACTIVATE_SITE;
use sitegrid_jobs::{ActivateSiteHandler, TrafficGate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitegrid_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let member_id = uuid::Uuid::new_v4();
    tracing::info!(member_id = %member_id, "Cluster member starting");

    let bus = Arc::new(CommandBus::default());
    let gate = Arc::new(TrafficGate::new());

    let mut listener = CommandListener::new();
    listener.on_command(
        CMD_ACTIVATE_SITE,
        Arc::new(ActivateSiteHandler::new(Arc::clone(&gate))) as Arc<dyn CommandHandler>,
    );
    let listener_handle = listener.spawn(bus.subscribe());

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
    drop(bus);
    let _ = listener_handle.await;
}
