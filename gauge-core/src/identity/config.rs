//! Configuration for the identity gateway

use serde::{Deserialize, Serialize};

/// Directory connection settings and the allow-list source
///
/// With `enabled = false` the mock gateway is used and `mock_secret`
/// authenticates any whitelisted subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Whether the real directory integration is active
    #[serde(default)]
    pub enabled: bool,

    /// Directory domain, e.g. "CORP"
    #[serde(default)]
    pub domain: String,

    /// Directory host
    #[serde(default)]
    pub host: String,

    /// Directory port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Search base DN
    #[serde(default)]
    pub base_dn: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Allow-list in `ID:NAME:ROLE:PERMISSIONS;...` form
    #[serde(default)]
    pub permitted_users: String,

    /// Shared secret accepted by the mock gateway when `enabled = false`
    #[serde(default = "default_mock_secret")]
    pub mock_secret: String,
}

fn default_port() -> u16 {
    389
}

fn default_timeout() -> u64 {
    10
}

fn default_mock_secret() -> String {
    "test123".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            domain: String::new(),
            host: String::new(),
            port: default_port(),
            base_dn: String::new(),
            timeout_secs: default_timeout(),
            permitted_users: String::new(),
            mock_secret: default_mock_secret(),
        }
    }
}

impl IdentityConfig {
    /// Check the config is usable (directory fields set when enabled)
    pub fn is_valid(&self) -> bool {
        if !self.enabled {
            return true;
        }
        !self.host.is_empty() && !self.domain.is_empty() && !self.base_dn.is_empty()
    }
}
