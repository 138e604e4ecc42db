//! Runtime configuration
//!
//! Resolved once at process start and injected into the service; there is
//! no ambient global configuration and no implicit reload. Reloading means
//! building a new config and constructing services from it.

use serde::{Deserialize, Serialize};

use crate::identity::IdentityConfig;
use crate::session::DEFAULT_TIME_LIMIT_MINUTES;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GaugeConfig {
    #[serde(default)]
    pub exam: ExamConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl GaugeConfig {
    /// Parse from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// Assessment attempt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Attempt time limit, fixed on each session at creation
    #[serde(default = "default_time_limit_minutes")]
    pub time_limit_minutes: u32,
}

fn default_time_limit_minutes() -> u32 {
    DEFAULT_TIME_LIMIT_MINUTES
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            time_limit_minutes: default_time_limit_minutes(),
        }
    }
}

/// Active expiry sweep settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Seconds between sweep passes
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
}

fn default_sweep_interval() -> u64 {
    30
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval(),
        }
    }
}

/// Session store lock behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a single lock acquisition may wait
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Bounded retries (with backoff) after a lock timeout
    #[serde(default = "default_lock_retry_attempts")]
    pub lock_retry_attempts: u32,
}

fn default_lock_timeout_ms() -> u64 {
    2000
}

fn default_lock_retry_attempts() -> u32 {
    3
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            lock_retry_attempts: default_lock_retry_attempts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GaugeConfig::default();
        assert_eq!(config.exam.time_limit_minutes, 40);
        assert_eq!(config.sweep.interval_secs, 30);
        assert_eq!(config.store.lock_timeout_ms, 2000);
        assert_eq!(config.store.lock_retry_attempts, 3);
        assert!(!config.identity.enabled);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = GaugeConfig::from_toml_str(
            r#"
            [exam]
            time_limit_minutes = 60

            [identity]
            permitted_users = "00058215:Nadir:hr:read,write,admin"
            "#,
        )
        .unwrap();

        assert_eq!(config.exam.time_limit_minutes, 60);
        assert_eq!(config.sweep.interval_secs, 30);
        assert!(config.identity.permitted_users.contains("Nadir"));
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = GaugeConfig::from_toml_str("").unwrap();
        assert_eq!(config.exam.time_limit_minutes, 40);
    }
}
