//! Message boundary with the identity service.
//!  - Commands go out through one unbounded channel, raw JSON events come back through another.
//!    Nothing is assumed about ordering between the two.
//!  - [service::IdentityProvider] hides the actual service. [local::LocalIdentityProvider] is an
//!    in-memory stand-in.

pub mod local;
pub mod messages;
pub mod service;
