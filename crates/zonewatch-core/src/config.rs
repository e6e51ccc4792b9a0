//! Poll configuration, read once from the environment at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable holding the polling interval in seconds.
pub const POLLING_INTERVAL_ENV: &str = "POLLING_INTERVAL";

pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 15;

/// CloudWatch namespace every record is published under.
pub const DEFAULT_NAMESPACE: &str = "CustomAZMetrics";

/// Immutable configuration handed to the poll loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to sleep between the end of one cycle and the start of the next.
    pub polling_interval_secs: u64,
    /// Metrics namespace.
    pub namespace: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            polling_interval_secs: DEFAULT_POLLING_INTERVAL_SECS,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl PollConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// An absent or unparsable interval falls back to the default. Zero is
    /// kept: cycles then run back to back.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(POLLING_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.polling_interval_secs = secs,
                _ => warn!(
                    value = %raw,
                    default_secs = DEFAULT_POLLING_INTERVAL_SECS,
                    "invalid {POLLING_INTERVAL_ENV}, using default"
                ),
            }
        }

        config
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_secs)
    }
}
