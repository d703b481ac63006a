//! Snapshot caching using Moka.
//!
//! Keys carry a generation counter. `invalidate` bumps the generation before
//! clearing, so a snapshot computed concurrently with a mutation is stored
//! under a stale key and never served.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use mealcard_shared::config::AnalyticsConfig;
use moka::sync::Cache;

use super::types::AnalyticsSnapshot;
use super::window::TimeWindow;

/// Default cache capacity (number of snapshots).
const DEFAULT_CACHE_CAPACITY: u64 = 64;

/// Default time-to-live for cached snapshots.
const DEFAULT_TTL_SECS: u64 = 60;

type CacheKey = (u64, TimeWindow);

/// Cache for analytics snapshots. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AnalyticsCache {
    cache: Cache<CacheKey, Arc<AnalyticsSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl AnalyticsCache {
    /// Creates a cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a cache from configuration.
    #[must_use]
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::with_config(config.cache_capacity, config.cache_ttl_secs)
    }

    /// Current generation. Read before computing a snapshot and pass it to
    /// [`Self::insert`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the snapshot cached for `window` in the current generation.
    #[must_use]
    pub fn get(&self, window: &TimeWindow) -> Option<Arc<AnalyticsSnapshot>> {
        self.cache.get(&(self.generation(), *window))
    }

    /// Stores a snapshot computed during `generation`.
    pub fn insert(&self, generation: u64, snapshot: AnalyticsSnapshot) -> Arc<AnalyticsSnapshot> {
        let snapshot = Arc::new(snapshot);
        if generation == self.generation() {
            self.cache
                .insert((generation, snapshot.window), Arc::clone(&snapshot));
        }
        snapshot
    }

    /// Drops every cached snapshot.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Aggregator;
    use crate::recharge::RequestStatusCounts;
    use chrono::Utc;
    use chrono_tz::Tz;

    fn snapshot(window: TimeWindow) -> AnalyticsSnapshot {
        Aggregator::snapshot(window, &[], RequestStatusCounts::default())
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = AnalyticsCache::new();
        let window = TimeWindow::today(Tz::UTC, Utc::now());
        assert!(cache.get(&window).is_none());

        cache.insert(cache.generation(), snapshot(window));
        assert!(cache.get(&window).is_some());
    }

    #[test]
    fn test_invalidate_drops_entries() {
        let cache = AnalyticsCache::new();
        let window = TimeWindow::today(Tz::UTC, Utc::now());
        cache.insert(cache.generation(), snapshot(window));

        cache.invalidate();
        assert!(cache.get(&window).is_none());
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_stale_generation_never_served() {
        let cache = AnalyticsCache::new();
        let window = TimeWindow::today(Tz::UTC, Utc::now());

        let generation = cache.generation();
        // a mutation lands while the snapshot is being computed
        cache.invalidate();
        cache.insert(generation, snapshot(window));

        assert!(cache.get(&window).is_none());
    }

    #[test]
    fn test_clones_share_invalidation() {
        let cache = AnalyticsCache::new();
        let clone = cache.clone();
        let window = TimeWindow::today(Tz::UTC, Utc::now());
        cache.insert(cache.generation(), snapshot(window));

        clone.invalidate();
        assert!(cache.get(&window).is_none());
    }
}
