//! Cluster-coordinated site jobs.
//!
//! The protocol in one sentence: the coordinating member durably persists
//! a state change, then broadcasts a command so every member — itself
//! included — converges to the new runtime behavior.
//!
//! - [`runner`] — the [`SiteJob`](runner::SiteJob) seam and the
//!   [`JobExecutor`](runner::JobExecutor) that drives the initiator phase.
//! - [`gate`] — member-local runtime state ([`ActiveSiteRegistry`],
//!   [`TrafficGate`]) written by jobs and read by the routing path.
//! - [`activate`] — the concrete site activation job and its worker-side
//!   command handler.

pub mod activate;
pub mod gate;
pub mod runner;

pub use activate::{ActivateSiteHandler, ActivateSitePayload, SiteActivateJob};
pub use gate::{ActiveSiteRegistry, TrafficGate};
pub use runner::{JobExecutor, SiteJob};
