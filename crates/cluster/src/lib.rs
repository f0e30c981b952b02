//! Cluster messaging for sitegrid.
//!
//! This crate provides the fan-out plumbing that lets a coordinating
//! member tell every cluster member — itself included — to apply a
//! runtime effect:
//!
//! - [`ClusterCommand`] — the transient command envelope.
//! - [`CommandBus`] — at-least-once broadcast hub backed by
//!   `tokio::sync::broadcast`.
//! - [`CommandListener`] — per-member subscriber loop dispatching
//!   delivered commands to registered handlers.

pub mod bus;
pub mod listener;

pub use bus::{ClusterCommand, CommandBus};
pub use listener::{CommandHandler, CommandListener};
