mod multithreaded_cache;

use chrono::{DateTime, Duration, Utc};

pub use multithreaded_cache::MultithreadedCache as MenuCache;

pub const DEFAULT_TTL: Duration = Duration::minutes(5);

/// Components must not contain this, or distinct queries share a key.
const KEY_DELIMITER: char = '|';

fn key(location: &str, date: &str, meal_type: &str) -> String {
    format!("{location}{KEY_DELIMITER}{date}{KEY_DELIMITER}{meal_type}")
}

#[derive(Debug, Clone)]
struct CacheEntry {
    items: Vec<String>,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(items: &[String]) -> Self {
        Self {
            items: items.to_vec(),
            cached_at: Utc::now(),
        }
    }

    #[inline]
    fn time_since_refresh(&self) -> Duration {
        Utc::now().signed_duration_since(self.cached_at)
    }

    #[inline]
    fn is_expired(&self, ttl: Duration) -> bool {
        self.time_since_refresh() > ttl
    }
}
