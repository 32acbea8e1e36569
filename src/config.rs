//! Configuration file structure
//!
//! Loaded from a JSON file. Every field has a default, and a missing file
//! yields the defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::{CliError, CliResult};
use crate::mutation::ReferencePolicy;
use crate::observability::LogFormat;
use crate::realtime::NotifierConfig;

/// Runtime configuration for shopgraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShopConfig {
    /// Events buffered per subscriber (default 64)
    #[serde(default = "default_subscriber_capacity")]
    pub subscriber_capacity: usize,

    /// Longest wait on one full subscriber, in milliseconds (default 5000)
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,

    /// Order reference checking (default permissive)
    #[serde(default)]
    pub reference_policy: ReferencePolicy,

    /// Log output format (default text)
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_subscriber_capacity() -> usize {
    64
}
fn default_publish_timeout_ms() -> u64 {
    5000
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: default_subscriber_capacity(),
            publish_timeout_ms: default_publish_timeout_ms(),
            reference_policy: ReferencePolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl ShopConfig {
    /// Load configuration from file, falling back to defaults if absent
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: ShopConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.subscriber_capacity == 0 {
            return Err(CliError::config_error("subscriber_capacity must be > 0"));
        }

        if self.publish_timeout_ms == 0 {
            return Err(CliError::config_error("publish_timeout_ms must be > 0"));
        }

        Ok(())
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig::new(self.subscriber_capacity, self.publish_timeout())
    }
}
