use std::collections::HashMap;

use chrono::Duration;
use futures_locks::RwLock;

use super::{key, CacheEntry};

/// Menu results keyed by `location|date|meal`, shared between request
/// handlers. One lock covers the whole key space.
#[derive(Debug)]
pub struct MultithreadedCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl MultithreadedCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A copy of the cached items, or `None` if absent or older than the TTL.
    /// Expired entries stay in place until [`Self::clean_expired`] or an
    /// overwrite.
    pub async fn get(&self, location: &str, date: &str, meal_type: &str) -> Option<Vec<String>> {
        let entries = self.entries.read().await;
        entries
            .get(&key(location, date, meal_type))
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.items.clone())
    }

    pub async fn set(&self, location: &str, date: &str, meal_type: &str, items: &[String]) {
        let mut entries = self.entries.write().await;
        entries.insert(key(location, date, meal_type), CacheEntry::new(items));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Returns how many entries were dropped.
    pub async fn clean_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        before - entries.len()
    }

    /// Entries physically stored, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for MultithreadedCache {
    fn default() -> Self {
        Self::new(super::DEFAULT_TTL)
    }
}
