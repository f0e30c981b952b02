//! Cluster command name constants.
//!
//! Used by the jobs crate when broadcasting and by each member's command
//! listener when registering worker handlers. Names are stable wire
//! identifiers; never rename a published constant.

/// Start accepting traffic for a site on every member.
pub const CMD_ACTIVATE_SITE: &str = "activate_site";
