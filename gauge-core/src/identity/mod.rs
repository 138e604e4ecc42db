//! Identity gateway boundary
//!
//! The core never talks to a directory itself; it consumes verified
//! identities through the [`IdentityGateway`] trait. The whitelist is
//! consulted before any credential check, so unlisted subjects never reach
//! the directory.

mod config;
mod error;
mod gateway;
mod mock;
mod types;
mod whitelist;

pub use config::IdentityConfig;
pub use error::AuthError;
pub use gateway::IdentityGateway;
pub use mock::MockGateway;
pub use types::{Identity, Permission, Role};
pub use whitelist::{Whitelist, WhitelistEntry};
