//! Expiration policy of a storage backend

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Whether a backend ever discards what it stores
///
/// Fixed when the backend is constructed. Aggregating layers read it to
/// decide whether data must also live somewhere that keeps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpirationPolicy {
    /// Items are retained indefinitely; per-item timeouts are ignored
    KeepForever,
    /// Items are expired by the store at the timeout given to `put`
    DiscardAfterTimeout,
}

impl ExpirationPolicy {
    pub fn from_discard_flag(discard_after_timeout: bool) -> Self {
        if discard_after_timeout {
            ExpirationPolicy::DiscardAfterTimeout
        } else {
            ExpirationPolicy::KeepForever
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpirationPolicy::KeepForever => "keep-forever",
            ExpirationPolicy::DiscardAfterTimeout => "discard-after-timeout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keep-forever" => Some(ExpirationPolicy::KeepForever),
            "discard-after-timeout" => Some(ExpirationPolicy::DiscardAfterTimeout),
            _ => None,
        }
    }

    pub fn discards(&self) -> bool {
        matches!(self, ExpirationPolicy::DiscardAfterTimeout)
    }

    /// Wall-clock expiry for an item written with `timeout` (Unix seconds),
    /// or `None` when this policy keeps items forever.
    pub fn expiry_for(&self, timeout: u64) -> Option<SystemTime> {
        match self {
            ExpirationPolicy::KeepForever => None,
            ExpirationPolicy::DiscardAfterTimeout => {
                UNIX_EPOCH.checked_add(Duration::from_secs(timeout))
            }
        }
    }
}

impl fmt::Display for ExpirationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
