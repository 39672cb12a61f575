//! Best-effort in-memory cache of recent turns.
//!
//! Keyed by the upstream link a turn produced (response id) so a caller can
//! look up what was said without another upstream round-trip. Entries are
//! bounded by count and age and may vanish at any time.

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedTurn {
    pub user_text: String,
    pub reply_text: String,
    pub model: String,
    pub stored_at: DateTime<Utc>,
}

impl CachedTurn {
    pub fn new(user_text: String, reply_text: String, model: String) -> Self {
        Self {
            user_text,
            reply_text,
            model,
            stored_at: Utc::now(),
        }
    }
}

pub struct TurnCache {
    /// `None` when caching is disabled.
    entries: Option<Mutex<LruCache<String, CachedTurn>>>,
    ttl: Duration,
}

impl TurnCache {
    /// A cache holding at most `capacity` turns for `ttl` each.
    /// A capacity of zero disables caching entirely.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            ttl,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn insert(&self, key: impl Into<String>, turn: CachedTurn) {
        if let Some(entries) = &self.entries {
            entries.lock().put(key.into(), turn);
        }
    }

    /// Fetch a live entry; expired entries are dropped on the way.
    pub fn get(&self, key: &str) -> Option<CachedTurn> {
        let mut entries = self.entries.as_ref()?.lock();
        let expired = entries
            .peek(key)
            .is_some_and(|turn| {
                (Utc::now() - turn.stored_at)
                    .to_std()
                    .is_ok_and(|age| age > self.ttl)
            });

        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .map(|entries| entries.lock().len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
