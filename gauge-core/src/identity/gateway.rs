//! IdentityGateway trait definition

use async_trait::async_trait;

use super::error::AuthError;
use super::types::Identity;

/// Capability interface to the external identity verification service
///
/// Implementations check the whitelist first, then verify credentials
/// against a directory. The core consumes only the returned role and
/// permissions; directory protocol details stay on the other side of this
/// trait.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Verify a subject's credentials and return its identity
    async fn verify(&self, subject_id: &str, secret: &str) -> Result<Identity, AuthError>;
}
