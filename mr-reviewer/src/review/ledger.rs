//! Process-wide record of already reviewed diff revisions.
//!
//! Key: `(project id, merge request iid, sha256(diff))`. Entries expire after
//! a TTL so the map stays bounded. Check-and-insert happens under one lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Identity of one reviewed diff revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub project: u64,
    pub iid: u64,
    pub diff_digest: String,
}

#[derive(Debug)]
pub struct ReviewLedger {
    ttl: Option<Duration>,
    keys: Mutex<HashMap<LedgerKey, Instant>>,
}

impl ReviewLedger {
    /// A ledger whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// A ledger that never reports duplicates.
    pub fn disabled() -> Self {
        Self {
            ttl: None,
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// `REVIEW_DEDUP_TTL_SECS` semantics: `0` disables.
    pub fn from_ttl_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::disabled()
        } else {
            Self::new(Duration::from_secs(secs))
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// True if `key` was recorded and has not expired.
    pub fn contains(&self, key: &LedgerKey) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        let now = Instant::now();
        let mut keys = self.keys.lock();
        keys.retain(|_, seen_at| now.duration_since(*seen_at) < ttl);
        keys.contains_key(key)
    }

    /// Returns true if this key is new and is now recorded.
    pub fn record_if_new(&self, key: &LedgerKey) -> bool {
        let Some(ttl) = self.ttl else {
            return true;
        };
        let now = Instant::now();
        let mut keys = self.keys.lock();
        keys.retain(|_, seen_at| now.duration_since(*seen_at) < ttl);

        if keys.contains_key(key) {
            return false;
        }
        keys.insert(key.clone(), now);
        true
    }

    /// Forgets `key` so a later run may deliver again.
    pub fn release(&self, key: &LedgerKey) {
        self.keys.lock().remove(key);
    }

    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReviewLedger {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}
