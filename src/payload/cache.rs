//! Tag-invalidated in-memory cache over a payload source.
//!
//! One entry per consumer unit. An entry registers the mutation tags that
//! affect it; firing a tag drops every entry carrying it, and the next
//! access refetches. At most one fetch is in flight per key: concurrent
//! subscribers await the same cell.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::info;

use crate::payload::fetch::PayloadSource;
use crate::payload::RecommendationPayload;

/// Mutation tags the rest of the application fires after write operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CacheTag {
    Recommendation,
    Contracts,
    EnergyBills,
    Tariffs,
}

impl CacheTag {
    /// Any of these invalidates a cached recommendation: the server-side
    /// computation depends on contracts, bills and tariffs alike.
    pub const RECOMMENDATION_DEPS: [CacheTag; 4] = [
        CacheTag::Recommendation,
        CacheTag::Contracts,
        CacheTag::EnergyBills,
        CacheTag::Tariffs,
    ];
}

#[derive(Debug, Clone)]
pub struct CachedPayload {
    pub captured_at: DateTime<Utc>,
    pub payload: RecommendationPayload,
}

struct Slot {
    tags: Vec<CacheTag>,
    cell: Arc<OnceCell<CachedPayload>>,
}

#[derive(Default)]
pub struct PayloadCache {
    slots: Mutex<HashMap<u64, Slot>>,
}

impl PayloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached payload for a consumer unit, fetching it through
    /// `source` on a miss. Concurrent callers for the same key share one
    /// in-flight fetch; a failed fetch leaves the slot empty so the next
    /// access retries.
    pub async fn get_or_fetch(
        &self,
        consumer_unit: u64,
        source: &dyn PayloadSource,
    ) -> Result<CachedPayload> {
        let cell = {
            let mut slots = self.slots.lock().expect("payload cache mutex poisoned");
            Arc::clone(
                &slots
                    .entry(consumer_unit)
                    .or_insert_with(|| Slot {
                        tags: CacheTag::RECOMMENDATION_DEPS.to_vec(),
                        cell: Arc::new(OnceCell::new()),
                    })
                    .cell,
            )
        };
        let cached = cell
            .get_or_try_init(|| async {
                let payload = source.fetch_recommendation(consumer_unit).await?;
                Ok::<_, anyhow::Error>(CachedPayload {
                    captured_at: Utc::now(),
                    payload,
                })
            })
            .await?;
        Ok(cached.clone())
    }

    /// Drops every entry registered under `tag`. Returns how many were
    /// dropped. In-flight fetches on dropped entries still complete for
    /// their current subscribers.
    pub fn invalidate(&self, tag: CacheTag) -> usize {
        let mut slots = self.slots.lock().expect("payload cache mutex poisoned");
        let before = slots.len();
        slots.retain(|_, slot| !slot.tags.contains(&tag));
        let dropped = before - slots.len();
        if dropped > 0 {
            info!("cache tag {tag:?} fired, dropped {dropped} entries");
        }
        dropped
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock().expect("payload cache mutex poisoned");
        slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use async_trait::async_trait;

    use super::{CacheTag, PayloadCache};
    use crate::payload::fetch::PayloadSource;
    use crate::payload::{RecommendationPayload, RecommendationSettings};

    struct CountingSource {
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PayloadSource for CountingSource {
        async fn fetch_recommendation(&self, _consumer_unit: u64) -> Result<RecommendationPayload> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(RecommendationPayload::sample())
        }

        async fn fetch_settings(&self) -> Result<RecommendationSettings> {
            Ok(RecommendationSettings::default())
        }
    }

    #[tokio::test]
    async fn concurrent_subscribers_share_one_fetch() {
        let cache = PayloadCache::new();
        let source = CountingSource::new();
        let (a, b, c) = tokio::join!(
            cache.get_or_fetch(1, &source),
            cache.get_or_fetch(1, &source),
            cache.get_or_fetch(1, &source),
        );
        a.expect("fetch a");
        b.expect("fetch b");
        c.expect("fetch c");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeat_access_hits_the_cache() {
        let cache = PayloadCache::new();
        let source = CountingSource::new();
        cache.get_or_fetch(1, &source).await.expect("first");
        cache.get_or_fetch(1, &source).await.expect("second");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tag_invalidation_forces_a_refetch() {
        let cache = PayloadCache::new();
        let source = CountingSource::new();
        cache.get_or_fetch(1, &source).await.expect("first");
        assert_eq!(cache.invalidate(CacheTag::EnergyBills), 1);
        cache.get_or_fetch(1, &source).await.expect("second");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_units_cache_independently() {
        let cache = PayloadCache::new();
        let source = CountingSource::new();
        cache.get_or_fetch(1, &source).await.expect("unit 1");
        cache.get_or_fetch(2, &source).await.expect("unit 2");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
