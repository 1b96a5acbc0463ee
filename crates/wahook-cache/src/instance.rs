// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-through cache of tenant configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use wahook_core::{Instance, InstanceLookup};

use crate::ttl::TtlCache;

/// Instance configuration cache backed by an [`InstanceLookup`].
///
/// Misses and expired entries go to the lookup, bounded by `lookup_timeout`.
/// Not-found, lookup errors and timeouts all resolve to `None`.
pub struct InstanceCache {
    entries: TtlCache<String, Instance>,
    lookup: Arc<dyn InstanceLookup>,
    lookup_timeout: Duration,
}

impl InstanceCache {
    pub fn new(lookup: Arc<dyn InstanceLookup>, ttl: Duration, lookup_timeout: Duration) -> Self {
        Self {
            entries: TtlCache::new(ttl),
            lookup,
            lookup_timeout,
        }
    }

    /// Returns the cached instance, loading it on miss or expiry.
    pub async fn get(&self, id: &str) -> Option<Instance> {
        let key = id.to_string();
        if let Some(instance) = self.entries.get(&key) {
            wahook_prometheus::record_cache_lookup("hit");
            return Some(instance);
        }

        match tokio::time::timeout(self.lookup_timeout, self.lookup.find_by_id(id)).await {
            Ok(Ok(Some(instance))) => {
                wahook_prometheus::record_cache_lookup("miss");
                self.entries.set(key, instance.clone());
                Some(instance)
            }
            Ok(Ok(None)) => {
                wahook_prometheus::record_cache_lookup("not_found");
                warn!(instance_id = id, "instance not found");
                None
            }
            Ok(Err(e)) => {
                wahook_prometheus::record_cache_lookup("error");
                error!(instance_id = id, error = %e, "instance lookup failed");
                None
            }
            Err(_) => {
                wahook_prometheus::record_cache_lookup("timeout");
                error!(
                    instance_id = id,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "instance lookup timed out"
                );
                None
            }
        }
    }

    /// Drop the cached copy so the next `get` reloads it.
    pub fn invalidate(&self, id: &str) {
        if self.entries.remove(&id.to_string()).is_some() {
            debug!(instance_id = id, "instance cache entry invalidated");
        }
    }

    /// Remove expired entries now; returns how many were evicted.
    pub fn sweep(&self) -> usize {
        self.entries.evict_expired()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict expired entries every `interval` until `cancel` fires.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = cache.sweep();
                        if evicted > 0 {
                            debug!(evicted, remaining = cache.len(), "instance cache swept");
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("instance cache sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wahook_test_utils::{MockLookup, test_instance};

    const TTL: Duration = Duration::from_secs(300);
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn cache_with(lookup: Arc<MockLookup>) -> InstanceCache {
        InstanceCache::new(lookup, TTL, TIMEOUT)
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl_skips_lookup() {
        let lookup = Arc::new(MockLookup::new().with_instance(test_instance("a", "http://hook")));
        let cache = cache_with(Arc::clone(&lookup));

        assert!(cache.get("a").await.is_some());
        assert_eq!(lookup.calls(), 1);

        tokio::time::advance(Duration::from_secs(120)).await;
        assert!(cache.get("a").await.is_some());
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_triggers_exactly_one_lookup() {
        let lookup = Arc::new(MockLookup::new().with_instance(test_instance("a", "http://hook")));
        let cache = cache_with(Arc::clone(&lookup));

        cache.get("a").await;
        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert!(cache.get("a").await.is_some());
        assert!(cache.get("a").await.is_some());
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_is_none_and_not_cached() {
        let lookup = Arc::new(MockLookup::new());
        let cache = cache_with(Arc::clone(&lookup));

        assert!(cache.get("ghost").await.is_none());
        assert!(cache.get("ghost").await.is_none());
        assert_eq!(lookup.calls(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_error_is_none() {
        let lookup = Arc::new(MockLookup::new().with_instance(test_instance("a", "http://hook")));
        lookup.set_failing(true);
        let cache = cache_with(Arc::clone(&lookup));
        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_times_out() {
        let lookup = Arc::new(
            MockLookup::new()
                .with_instance(test_instance("a", "http://hook"))
                .with_delay(Duration::from_secs(30)),
        );
        let cache = cache_with(Arc::clone(&lookup));
        assert!(cache.get("a").await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_reload() {
        let lookup = Arc::new(MockLookup::new().with_instance(test_instance("a", "http://old")));
        let cache = cache_with(Arc::clone(&lookup));
        assert_eq!(cache.get("a").await.unwrap().webhook.url, "http://old");

        lookup.insert(test_instance("a", "http://new"));
        assert_eq!(cache.get("a").await.unwrap().webhook.url, "http://old");

        cache.invalidate("a");
        assert_eq!(cache.get("a").await.unwrap().webhook.url, "http://new");
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_expired_entries_until_cancelled() {
        let lookup = Arc::new(MockLookup::new().with_instance(test_instance("a", "http://hook")));
        let cache = Arc::new(cache_with(lookup));
        cache.get("a").await;
        assert_eq!(cache.len(), 1);

        let cancel = CancellationToken::new();
        let handle = cache.spawn_sweeper(Duration::from_secs(600), cancel.clone());

        // ttl passes, sweep has not run yet
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(cache.len(), 1);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(cache.len(), 0);

        cancel.cancel();
        handle.await.unwrap();
    }
}
