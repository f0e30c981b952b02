//! Database entity models.

pub mod site;

pub use site::Site;
