//! Cluster-wide site activation.
//!
//! Initiator phase (coordinating member): flip the persisted `active`
//! flag, then broadcast `activate_site`. The write strictly precedes the
//! broadcast — a load or save failure aborts the pipeline and no command
//! is ever published. Worker phase (every member, on delivery): open the
//! local traffic gate for the site.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitegrid_cluster::{ClusterCommand, CommandBus, CommandHandler};
use sitegrid_core::commands::CMD_ACTIVATE_SITE;
use sitegrid_core::types::{JobId, MemberId};
use sitegrid_core::{JobError, JobTask, TaskPipeline};
use sitegrid_db::SiteStore;

use crate::gate::{ActiveSiteRegistry, TrafficGate};
use crate::runner::SiteJob;

/// Wire payload of the `activate_site` command.
///
/// Key names are part of the cluster wire format; keep them camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateSitePayload {
    #[serde(rename = "jobId")]
    pub job_id: JobId,
    pub site: String,
}

/// Job that activates a site in storage and tells the cluster to start
/// accepting traffic for it.
pub struct SiteActivateJob {
    site_uid: String,
    member: MemberId,
    store: Arc<dyn SiteStore>,
    bus: Arc<CommandBus>,
    registry: Arc<ActiveSiteRegistry>,
    gate: Arc<TrafficGate>,
}

impl SiteActivateJob {
    pub fn new(
        site_uid: impl Into<String>,
        member: MemberId,
        store: Arc<dyn SiteStore>,
        bus: Arc<CommandBus>,
        registry: Arc<ActiveSiteRegistry>,
        gate: Arc<TrafficGate>,
    ) -> Self {
        Self {
            site_uid: site_uid.into(),
            member,
            store,
            bus,
            registry,
            gate,
        }
    }
}

impl SiteJob for SiteActivateJob {
    fn job_type(&self) -> &'static str {
        "site.activate"
    }

    fn site_uid(&self) -> &str {
        &self.site_uid
    }

    fn initiator_tasks(&self, job_id: JobId) -> Vec<JobTask> {
        vec![
            persistence_task(
                Arc::clone(&self.store),
                Arc::clone(&self.registry),
                self.site_uid.clone(),
            ),
            broadcast_task(Arc::clone(&self.bus), self.site_uid.clone(), job_id, self.member),
        ]
    }

    fn worker_tasks(&self) -> Vec<JobTask> {
        worker_tasks_for(Arc::clone(&self.gate), self.site_uid.clone())
    }
}

/// Load the site, set `active = true`, save, then flip the coordinator's
/// member-local registry entry ahead of the broadcast round-trip.
fn persistence_task(
    store: Arc<dyn SiteStore>,
    registry: Arc<ActiveSiteRegistry>,
    uid: String,
) -> JobTask {
    Box::pin(async move {
        let mut site = store
            .load_by_uid(&uid)
            .await
            .map_err(|e| {
                tracing::error!(site = %uid, error = %e, "Failed to load site record");
                JobError::from(e)
            })?
            .ok_or_else(|| JobError::SiteNotFound { uid: uid.clone() })?;

        site.active = true;
        site.updated_at = chrono::Utc::now();
        store.save(&site).await.map_err(|e| {
            tracing::error!(site = %uid, error = %e, "Failed to persist site activation");
            JobError::from(e)
        })?;

        // Local convergence on the coordinator happens immediately; the
        // saved record's key is authoritative here.
        registry.activate(&site.uid).await;
        Ok(serde_json::json!({ "site": site.uid, "active": true }))
    })
}

/// Publish `activate_site` to every cluster member. Runs only after the
/// durable write succeeded.
fn broadcast_task(bus: Arc<CommandBus>, uid: String, job_id: JobId, member: MemberId) -> JobTask {
    Box::pin(async move {
        let payload = ActivateSitePayload {
            job_id,
            site: uid.clone(),
        };
        let command = ClusterCommand::new(CMD_ACTIVATE_SITE, job_id, member).with_payload(
            serde_json::to_value(&payload)
                .map_err(|e| JobError::Broadcast(format!("payload encode: {e}")))?,
        );

        match bus.publish(command) {
            Ok(members) => Ok(serde_json::json!({ "delivered_to": members })),
            Err(e) => {
                // The write already happened: storage says active but the
                // cluster was not told. Surface the gap loudly.
                tracing::error!(
                    site = %uid,
                    job_id = %job_id,
                    error = %e,
                    "Broadcast failed after durable write; site is active in storage but the cluster has not converged"
                );
                Err(e)
            }
        }
    })
}

/// The worker phase: open the member-local traffic gate. Idempotent.
fn worker_tasks_for(gate: Arc<TrafficGate>, uid: String) -> Vec<JobTask> {
    vec![Box::pin(async move {
        gate.start_accepting(&uid).await;
        Ok(serde_json::json!({ "site": uid, "accepting": true }))
    })]
}

/// Worker-side handler for `activate_site`, registered on every member's
/// command listener.
pub struct ActivateSiteHandler {
    gate: Arc<TrafficGate>,
}

impl ActivateSiteHandler {
    pub fn new(gate: Arc<TrafficGate>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl CommandHandler for ActivateSiteHandler {
    async fn handle(&self, command: ClusterCommand) -> Result<(), JobError> {
        let payload: ActivateSitePayload = serde_json::from_value(command.payload)
            .map_err(|e| JobError::Worker(format!("bad activate_site payload: {e}")))?;

        tracing::info!(
            job_id = %payload.job_id,
            site = %payload.site,
            origin = %command.origin,
            "Applying site activation on this member"
        );

        let tasks = worker_tasks_for(Arc::clone(&self.gate), payload.site);
        TaskPipeline::run(tasks, |_| {}).await.map(|_| ())
    }
}
