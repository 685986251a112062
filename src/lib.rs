//! Small single-user time tracker. A timer is started and stopped, finished intervals are summed up
//! per calendar day, and signing in goes through a message bridge to an identity service.
//!

pub mod app;
pub mod cli;
pub mod error;
pub mod identity;
pub mod tracking;
pub mod utils;
