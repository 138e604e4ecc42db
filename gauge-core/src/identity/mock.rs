//! Mock identity gateway
//!
//! Used when the directory integration is disabled: any whitelisted subject
//! authenticates with the shared mock secret. Tests also drive it directly.

use async_trait::async_trait;
use tracing::debug;

use super::error::AuthError;
use super::gateway::IdentityGateway;
use super::types::Identity;
use super::whitelist::Whitelist;

/// Directory-less gateway backed by the whitelist and a fixed secret
pub struct MockGateway {
    whitelist: Whitelist,
    secret: String,
    /// When set, every verification fails as if the directory were down
    unavailable: bool,
}

impl MockGateway {
    pub fn new(whitelist: Whitelist, secret: impl Into<String>) -> Self {
        Self {
            whitelist,
            secret: secret.into(),
            unavailable: false,
        }
    }

    /// Build from configuration with the directory integration disabled
    pub fn from_config(config: &super::config::IdentityConfig) -> Self {
        Self::new(
            Whitelist::parse(&config.permitted_users),
            config.mock_secret.clone(),
        )
    }

    /// Simulate an unreachable directory
    pub fn unavailable(whitelist: Whitelist) -> Self {
        Self {
            whitelist,
            secret: String::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl IdentityGateway for MockGateway {
    async fn verify(&self, subject_id: &str, secret: &str) -> Result<Identity, AuthError> {
        // Whitelist first: unlisted subjects never reach the directory
        let entry = self
            .whitelist
            .get(subject_id)
            .ok_or(AuthError::NotWhitelisted)?;

        if self.unavailable {
            return Err(AuthError::UpstreamUnavailable("directory offline".into()));
        }

        if secret != self.secret {
            debug!(subject = subject_id, "mock verification rejected");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(
            Identity::new(subject_id, entry.display_name.clone(), entry.role)
                .with_permissions(entry.permissions.clone()),
        )
    }
}
