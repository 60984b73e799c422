//! Tagged, TTL-bounded cache of query results.
//!
//! Entries are keyed by [`CacheKey`]: the variant is the tag, its payload
//! the query parameters. Writes invalidate whole tags through
//! [`QueryCache::invalidate_tag`] or patch a single entry in place through
//! [`QueryCache::update`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use nordetect_core::query::ReadingListQuery;
use nordetect_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const READINGS_TAG: &str = "readings";
pub const LATEST_TAG: &str = "latest";
pub const STATS_TAG: &str = "stats";
pub const READING_TAG: &str = "reading";

/// Freshness window for list and latest queries.
pub const READINGS_TTL: Duration = Duration::from_secs(30);
/// Freshness window for aggregate counts.
pub const STATS_TTL: Duration = Duration::from_secs(60);
/// Readings are immutable, so a single row stays valid much longer.
pub const READING_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Readings(ReadingListQuery),
    Latest,
    Stats,
    Reading(DbId),
}

impl CacheKey {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Readings(_) => READINGS_TAG,
            Self::Latest => LATEST_TAG,
            Self::Stats => STATS_TAG,
            Self::Reading(_) => READING_TAG,
        }
    }

    pub fn ttl(&self) -> Duration {
        match self {
            Self::Readings(_) | Self::Latest => READINGS_TTL,
            Self::Stats => STATS_TTL,
            Self::Reading(_) => READING_TTL,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// Thread-safe query cache shared by all requests of one client.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh cached value for `key`, if any.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at<T: DeserializeOwned>(&self, key: &CacheKey, now: Instant) -> Option<T> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if entry.expires_at <= now {
            entries.remove(key);
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store `value` under `key` with the key's TTL.
    pub fn insert<T: Serialize>(&self, key: CacheKey, value: &T) {
        self.insert_at(key, value, Instant::now());
    }

    /// Expired entries are evicted on every insert, so keys that are never
    /// read again do not accumulate.
    pub fn insert_at<T: Serialize>(&self, key: CacheKey, value: &T, now: Instant) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(tag = key.tag(), error = %e, "Skipping uncacheable value");
                return;
            }
        };
        let expires_at = now + key.ttl();
        let mut entries = self.lock();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Patch a fresh entry in place, keeping its expiry. Returns whether an
    /// entry was updated.
    pub fn update<T, F>(&self, key: &CacheKey, patch: F) -> bool
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        self.update_at(key, patch, Instant::now())
    }

    pub fn update_at<T, F>(&self, key: &CacheKey, patch: F, now: Instant) -> bool
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key).filter(|e| e.expires_at > now) else {
            return false;
        };
        let Ok(mut value) = serde_json::from_value::<T>(entry.value.clone()) else {
            entries.remove(key);
            return false;
        };
        patch(&mut value);
        match serde_json::to_value(&value) {
            Ok(patched) => {
                entry.value = patched;
                true
            }
            Err(_) => {
                entries.remove(key);
                false
            }
        }
    }

    /// Drop every entry carrying `tag`. Returns how many were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| key.tag() != tag);
        let removed = before - entries.len();
        tracing::debug!(tag, removed, "Invalidated cache tag");
        removed
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_query(device_id: &str) -> CacheKey {
        CacheKey::Readings(ReadingListQuery {
            device_id: Some(device_id.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn hit_within_ttl_and_miss_after() {
        let cache = QueryCache::new();
        let t0 = Instant::now();
        cache.insert_at(CacheKey::Stats, &vec![1, 2, 3], t0);

        let hit: Option<Vec<i32>> = cache.get_at(&CacheKey::Stats, t0 + Duration::from_secs(59));
        assert_eq!(hit, Some(vec![1, 2, 3]));

        let miss: Option<Vec<i32>> = cache.get_at(&CacheKey::Stats, t0 + STATS_TTL);
        assert_eq!(miss, None);
        assert!(cache.is_empty(), "expired entry is evicted on read");
    }

    #[test]
    fn params_are_part_of_the_key() {
        let cache = QueryCache::new();
        cache.insert(device_query("GH001"), &"one");

        assert_eq!(cache.get::<String>(&device_query("GH001")).as_deref(), Some("one"));
        assert_eq!(cache.get::<String>(&device_query("GH002")), None);
        assert_eq!(cache.get::<String>(&CacheKey::Readings(ReadingListQuery::default())), None);
    }

    #[test]
    fn invalidate_tag_only_drops_that_tag() {
        let cache = QueryCache::new();
        cache.insert(device_query("GH001"), &1);
        cache.insert(device_query("GH002"), &2);
        cache.insert(CacheKey::Latest, &3);
        cache.insert(CacheKey::Reading(7), &4);

        assert_eq!(cache.invalidate_tag(READINGS_TAG), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get::<i32>(&CacheKey::Latest), Some(3));
        assert_eq!(cache.get::<i32>(&CacheKey::Reading(7)), Some(4));
    }

    #[test]
    fn update_patches_in_place_and_keeps_expiry() {
        let cache = QueryCache::new();
        let t0 = Instant::now();
        cache.insert_at(CacheKey::Latest, &vec!["GH001".to_string()], t0);

        let later = t0 + Duration::from_secs(10);
        let updated = cache.update_at(
            &CacheKey::Latest,
            |v: &mut Vec<String>| v.push("GH002".into()),
            later,
        );
        assert!(updated);

        let value: Option<Vec<String>> = cache.get_at(&CacheKey::Latest, later);
        assert_eq!(value, Some(vec!["GH001".to_string(), "GH002".to_string()]));

        let expired: Option<Vec<String>> = cache.get_at(&CacheKey::Latest, t0 + READINGS_TTL);
        assert_eq!(expired, None);
    }

    #[test]
    fn update_without_entry_is_a_no_op() {
        let cache = QueryCache::new();
        assert!(!cache.update(&CacheKey::Latest, |v: &mut Vec<String>| v.clear()));
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_evicts_expired_entries() {
        let cache = QueryCache::new();
        let t0 = Instant::now();

        for minute in 0..500u64 {
            let key = CacheKey::Readings(ReadingListQuery {
                start_date: Some(format!("2024-03-15T{:02}:{:02}:00Z", minute / 60, minute % 60)),
                ..Default::default()
            });
            cache.insert_at(key, &minute, t0 + Duration::from_secs(minute * 120));
        }

        assert_eq!(cache.len(), 1, "only the last poll is still fresh");
    }

    #[test]
    fn insert_keeps_fresh_entries() {
        let cache = QueryCache::new();
        let t0 = Instant::now();
        cache.insert_at(CacheKey::Stats, &1, t0);
        cache.insert_at(CacheKey::Latest, &2, t0 + Duration::from_secs(20));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at::<i32>(&CacheKey::Stats, t0 + Duration::from_secs(20)), Some(1));
    }

    #[test]
    fn ttls_by_tag() {
        assert_eq!(CacheKey::Latest.ttl(), Duration::from_secs(30));
        assert_eq!(device_query("GH001").ttl(), Duration::from_secs(30));
        assert_eq!(CacheKey::Stats.ttl(), Duration::from_secs(60));
    }
}
