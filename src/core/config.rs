use crate::core::error::{GitOpsError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`GitOpsManager`](crate::GitOpsManager)
///
/// All values are plain scalars with documented defaults. Timeout, retry
/// count and working directory can additionally be overridden per call on
/// [`GitCommand`](crate::GitCommand).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitOpsConfig {
    /// Maximum number of commands executing concurrently
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Maximum number of cached results
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Default cache TTL in seconds
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Default per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Default number of retries after a failed attempt
    #[serde(default = "default_retries")]
    pub default_retries: u32,

    /// Fixed delay between retry attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Period of the background expired-entry sweep in seconds
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,

    /// Default working directory for command execution
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Name or path of the git binary to invoke
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
}

impl Default for GitOpsConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            cache_size: default_cache_size(),
            default_ttl_secs: default_ttl_secs(),
            default_timeout_secs: default_timeout_secs(),
            default_retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
            working_dir: default_working_dir(),
            git_binary: default_git_binary(),
        }
    }
}

impl GitOpsConfig {
    /// Default cache TTL as a [`Duration`]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Default per-attempt timeout as a [`Duration`]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Delay between retry attempts as a [`Duration`]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Background maintenance period as a [`Duration`]
    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`GitOpsError::Configuration`] when a limit that must be
    /// positive is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(GitOpsError::configuration("max_workers must be at least 1"));
        }
        if self.cache_size == 0 {
            return Err(GitOpsError::configuration("cache_size must be at least 1"));
        }
        if self.default_timeout_secs == 0 {
            return Err(GitOpsError::configuration(
                "default_timeout_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_max_workers() -> usize {
    num_cpus::get().clamp(1, 8)
}

fn default_cache_size() -> usize {
    100
}

fn default_ttl_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_maintenance_interval_secs() -> u64 {
    60
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_git_binary() -> String {
    "git".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GitOpsConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.max_workers >= 1);
        assert_eq!(config.cache_size, 100);
        assert_eq!(config.default_ttl(), Duration::from_secs(30));
        assert_eq!(config.retry_delay(), Duration::from_millis(500));
        assert_eq!(config.git_binary, "git");
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = GitOpsConfig::default();
        config.max_workers = 0;
        assert!(config.validate().is_err());

        let mut config = GitOpsConfig::default();
        config.cache_size = 0;
        assert!(config.validate().is_err());

        let mut config = GitOpsConfig::default();
        config.default_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_take_defaults_when_deserializing() {
        let config: GitOpsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cache_size, 100);
        assert_eq!(config.default_retries, 2);
        assert_eq!(config.working_dir, PathBuf::from("."));
    }
}
