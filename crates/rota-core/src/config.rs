//! Store tunables.

use chrono::Duration;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_PAYLOAD_BYTES: usize = 2 * 1024;
const DEFAULT_LEASE_SECS: u64 = 10 * 60;

/// Limits applied by a `JobStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Largest payload a client may submit, in bytes. The store itself keeps
    /// whatever `add` is given; the front end reads this through
    /// `JobStore::config` and rejects oversized payloads before they arrive.
    pub max_payload_bytes: usize,

    /// How long a pulled job stays out of circulation, for queues without
    /// their own lease.
    pub default_lease_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            default_lease_secs: DEFAULT_LEASE_SECS,
        }
    }
}

impl StoreConfig {
    pub fn with_max_payload_bytes(mut self, max: usize) -> Self {
        self.max_payload_bytes = max;
        self
    }

    pub fn with_default_lease_secs(mut self, secs: u64) -> Self {
        self.default_lease_secs = secs;
        self
    }

    pub fn default_lease(&self) -> Duration {
        lease_from_secs(self.default_lease_secs)
    }
}

/// Seconds to a lease duration, saturating at the largest representable one.
pub fn lease_from_secs(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = StoreConfig::default();
        assert_eq!(config.max_payload_bytes, 2048);
        assert_eq!(config.default_lease(), Duration::minutes(10));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"default_lease_secs": 5}"#).unwrap();
        assert_eq!(config.default_lease_secs, 5);
        assert_eq!(config.max_payload_bytes, 2048);
    }

    #[test]
    fn huge_lease_saturates() {
        assert_eq!(lease_from_secs(u64::MAX), Duration::MAX);
        assert_eq!(lease_from_secs(3), Duration::seconds(3));
    }
}
