//! End-to-end tests for cluster-wide site activation: one coordinating
//! member persists the change and broadcasts, every member (coordinator
//! included) opens its traffic gate on delivery.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sitegrid_cluster::{CommandBus, CommandHandler, CommandListener};
use sitegrid_core::{ConcurrencyLimiter, Job, JobError, JobStatus, ProgressTracker};
use sitegrid_db::{MemorySiteStore, Site, SiteStore, StoreError};
use sitegrid_jobs::{ActivateSiteHandler, ActiveSiteRegistry, JobExecutor, SiteActivateJob, SiteJob, TrafficGate};

/// One cluster member: a traffic gate plus a running command listener.
struct Member {
    gate: Arc<TrafficGate>,
    _listener: tokio::task::JoinHandle<()>,
}

fn spawn_member(bus: &CommandBus) -> Member {
    let gate = Arc::new(TrafficGate::new());
    let mut listener = CommandListener::new();
    listener.on_command(
        sitegrid_core::commands::CMD_ACTIVATE_SITE,
        Arc::new(ActivateSiteHandler::new(Arc::clone(&gate))) as Arc<dyn CommandHandler>,
    );
    let handle = listener.spawn(bus.subscribe());
    Member {
        gate,
        _listener: handle,
    }
}

fn executor() -> JobExecutor {
    JobExecutor::new(
        Arc::new(ConcurrencyLimiter::new()),
        Arc::new(ProgressTracker::new()),
    )
}

fn inactive_site(uid: &str) -> Site {
    Site::new(uid, format!("Site {uid}"), format!("{uid}.example.com"))
}

/// Poll until `check` passes or the timeout elapses.
async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
}

#[tokio::test]
async fn activation_converges_across_all_members() {
    let bus = Arc::new(CommandBus::default());
    let coordinator = spawn_member(&bus);
    let remote_a = spawn_member(&bus);
    let remote_b = spawn_member(&bus);
    let mut probe = bus.subscribe();

    let store: Arc<dyn SiteStore> = Arc::new(MemorySiteStore::with_sites([inactive_site("site-42")]));
    let registry = Arc::new(ActiveSiteRegistry::new());
    let member_id = uuid::Uuid::new_v4();

    let runner = SiteActivateJob::new(
        "site-42",
        member_id,
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&registry),
        Arc::clone(&coordinator.gate),
    );
    let mut job = Job::new(runner.job_type(), runner.site_uid(), member_id);

    executor().run(&mut job, &runner).await.unwrap();

    // Coordinator-side guarantees hold as soon as run() returns.
    assert_eq!(job.status, JobStatus::Succeeded);
    assert_eq!(job.progress_percent, 100);
    let saved = store.load_by_uid("site-42").await.unwrap().unwrap();
    assert!(saved.active, "durable flag must be set");
    assert!(registry.is_active("site-42").await);
    assert!(coordinator.gate.is_accepting("site-42").await);

    // The command went out exactly once with the expected wire shape.
    let command = probe.recv().await.unwrap();
    assert_eq!(command.name, "activate_site");
    assert_eq!(command.payload["site"], "site-42");
    assert_eq!(command.payload["jobId"], serde_json::json!(job.id));
    assert_eq!(command.origin, member_id);

    // Remote members converge independently of the coordinator.
    wait_until(|| remote_a.gate.is_accepting("site-42")).await;
    wait_until(|| remote_b.gate.is_accepting("site-42")).await;
}

#[tokio::test]
async fn missing_site_fails_without_broadcast() {
    let bus = Arc::new(CommandBus::default());
    let member = spawn_member(&bus);
    let mut probe = bus.subscribe();

    let store: Arc<dyn SiteStore> = Arc::new(MemorySiteStore::new());
    let registry = Arc::new(ActiveSiteRegistry::new());
    let member_id = uuid::Uuid::new_v4();

    let runner = SiteActivateJob::new(
        "site-99",
        member_id,
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&registry),
        Arc::clone(&member.gate),
    );
    let mut job = Job::new(runner.job_type(), runner.site_uid(), member_id);

    let result = executor().run(&mut job, &runner).await;

    assert!(matches!(result, Err(JobError::SiteNotFound { .. })));
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("Site not found"));
    assert!(job.progress_percent < 100);

    // Nothing was published and no runtime state moved anywhere.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(matches!(
        probe.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
    assert!(!registry.is_active("site-99").await);
    assert!(!member.gate.is_accepting("site-99").await);
}

/// Store whose saves always fail; loads come from the inner memory store.
struct BrokenSaveStore {
    inner: MemorySiteStore,
}

#[async_trait]
impl SiteStore for BrokenSaveStore {
    async fn load_by_uid(&self, uid: &str) -> Result<Option<Site>, StoreError> {
        self.inner.load_by_uid(uid).await
    }

    async fn save(&self, _site: &Site) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".to_string()))
    }
}

#[tokio::test]
async fn save_failure_fails_the_job_without_broadcast() {
    let bus = Arc::new(CommandBus::default());
    let member = spawn_member(&bus);
    let mut probe = bus.subscribe();

    let store: Arc<dyn SiteStore> = Arc::new(BrokenSaveStore {
        inner: MemorySiteStore::with_sites([inactive_site("site-42")]),
    });
    let registry = Arc::new(ActiveSiteRegistry::new());
    let member_id = uuid::Uuid::new_v4();

    let runner = SiteActivateJob::new(
        "site-42",
        member_id,
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&registry),
        Arc::clone(&member.gate),
    );
    let mut job = Job::new(runner.job_type(), runner.site_uid(), member_id);

    let result = executor().run(&mut job, &runner).await;

    assert!(matches!(result, Err(JobError::Persistence(_))));
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(
        job.error_message.as_deref(),
        Some("Persistence failure: Storage failure: disk full")
    );

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(matches!(
        probe.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
    // The failed write never reached the coordinator's registry either.
    assert!(!registry.is_active("site-42").await);
}

#[tokio::test]
async fn reactivating_an_active_site_is_idempotent() {
    let bus = Arc::new(CommandBus::default());
    let member = spawn_member(&bus);
    let mut probe = bus.subscribe();

    let mut already_active = inactive_site("site-42");
    already_active.active = true;
    let store: Arc<dyn SiteStore> = Arc::new(MemorySiteStore::with_sites([already_active]));
    let registry = Arc::new(ActiveSiteRegistry::new());
    let member_id = uuid::Uuid::new_v4();

    let runner = SiteActivateJob::new(
        "site-42",
        member_id,
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&registry),
        Arc::clone(&member.gate),
    );
    let mut job = Job::new(runner.job_type(), runner.site_uid(), member_id);

    executor().run(&mut job, &runner).await.unwrap();

    // Same write, same broadcast, no adverse effect at the worker.
    assert_eq!(job.status, JobStatus::Succeeded);
    assert!(store.load_by_uid("site-42").await.unwrap().unwrap().active);
    assert_eq!(probe.recv().await.unwrap().name, "activate_site");
    wait_until(|| member.gate.is_accepting("site-42")).await;
}

#[tokio::test]
async fn broadcast_failure_surfaces_after_the_write() {
    // No member is subscribed: publishing fails even though the durable
    // write already happened. The job must report the failure rather than
    // pretend the cluster converged.
    let bus = Arc::new(CommandBus::default());
    let store: Arc<dyn SiteStore> = Arc::new(MemorySiteStore::with_sites([inactive_site("site-42")]));
    let registry = Arc::new(ActiveSiteRegistry::new());
    let member_id = uuid::Uuid::new_v4();

    let runner = SiteActivateJob::new(
        "site-42",
        member_id,
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&registry),
        Arc::new(TrafficGate::new()),
    );
    let mut job = Job::new(runner.job_type(), runner.site_uid(), member_id);

    let result = executor().run(&mut job, &runner).await;

    assert!(matches!(result, Err(JobError::Broadcast(_))));
    assert_eq!(job.status, JobStatus::Failed);
    // Latent inconsistency: storage already says active.
    assert!(store.load_by_uid("site-42").await.unwrap().unwrap().active);
    assert!(registry.is_active("site-42").await);
}

/// Store that stalls every save so overlap between two jobs would be
/// observable.
struct SlowStore {
    inner: MemorySiteStore,
    saving: AtomicUsize,
    max_overlap: AtomicUsize,
}

#[async_trait]
impl SiteStore for SlowStore {
    async fn load_by_uid(&self, uid: &str) -> Result<Option<Site>, StoreError> {
        self.inner.load_by_uid(uid).await
    }

    async fn save(&self, site: &Site) -> Result<(), StoreError> {
        let now = self.saving.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_overlap.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.saving.fetch_sub(1, Ordering::SeqCst);
        self.inner.save(site).await
    }
}

#[tokio::test]
async fn concurrent_activations_for_one_site_are_serialized() {
    let bus = Arc::new(CommandBus::default());
    let member = spawn_member(&bus);

    let store = Arc::new(SlowStore {
        inner: MemorySiteStore::with_sites([inactive_site("site-42")]),
        saving: AtomicUsize::new(0),
        max_overlap: AtomicUsize::new(0),
    });
    let registry = Arc::new(ActiveSiteRegistry::new());
    let executor = Arc::new(executor());

    let mut handles = Vec::new();
    for _ in 0..2 {
        let store: Arc<dyn SiteStore> = Arc::clone(&store) as Arc<dyn SiteStore>;
        let bus = Arc::clone(&bus);
        let registry = Arc::clone(&registry);
        let gate = Arc::clone(&member.gate);
        let executor = Arc::clone(&executor);
        handles.push(tokio::spawn(async move {
            let member_id = uuid::Uuid::new_v4();
            let runner = SiteActivateJob::new("site-42", member_id, store, bus, registry, gate);
            let mut job = Job::new(runner.job_type(), runner.site_uid(), member_id);
            executor.run(&mut job, &runner).await.map(|_| job.status)
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), JobStatus::Succeeded);
    }
    assert_eq!(
        store.max_overlap.load(Ordering::SeqCst),
        1,
        "two activation jobs must never hold the running slot together"
    );
}
