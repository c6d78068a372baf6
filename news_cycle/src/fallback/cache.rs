//! Cache of previously seen items, ranked by freshness and relevance.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::{ClassifiedItem, EventCategory};
use crate::config::CacheConfig;
use crate::content::{RawItem, SourceKind};
use crate::error::{NewsError, Result};

/// Snapshot format version written by [`CacheManager::save_to_path`].
pub const CACHE_SNAPSHOT_VERSION: u32 = 1;

/// A durable, reusable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedItem {
    pub id: String,
    /// Where the item originally came from.
    pub source: SourceKind,
    pub headline: String,
    pub summary: String,
    pub publisher: String,
    pub published_at: DateTime<Utc>,
    pub category: EventCategory,
    pub keywords: Vec<String>,
    /// 0-100.
    pub relevance: f32,
    /// 0-100.
    pub controversy: f32,
    /// 0-100. Items below the configured floor are pruned.
    pub quality: f32,
    pub cached_at: DateTime<Utc>,
    #[serde(default)]
    pub served_count: u32,
    /// Insertion order, for tie-breaking.
    #[serde(default)]
    pub sequence: u64,
}

impl CachedItem {
    pub fn from_classified(item: &ClassifiedItem, source: SourceKind, now: DateTime<Utc>) -> Self {
        Self {
            id: item.item.id.clone(),
            source,
            headline: item.item.headline.clone(),
            summary: item.item.summary.clone(),
            publisher: item.item.source.clone(),
            published_at: item.item.published_at,
            category: item.category,
            keywords: item.keywords.clone(),
            relevance: item.relevance,
            controversy: item.controversy,
            quality: quality(item),
            cached_at: now,
            served_count: 0,
            sequence: 0,
        }
    }

    pub fn to_raw(&self) -> RawItem {
        RawItem::new(
            self.id.clone(),
            self.headline.clone(),
            self.summary.clone(),
            self.publisher.clone(),
            self.published_at,
        )
    }

    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        ((now - self.cached_at).num_milliseconds().max(0)) as f64 / 3_600_000.0
    }
}

/// Quality blends relevance with how much there is to react to.
fn quality(item: &ClassifiedItem) -> f32 {
    let substance = if item.item.summary.trim().is_empty() { 0.0 } else { 10.0 };
    (item.relevance * 0.7 + item.controversy * 0.2 + substance).min(100.0)
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    version: u32,
    items: Vec<CachedItem>,
}

/// Stores, evicts and serves cached items.
#[derive(Debug, Clone)]
pub struct CacheManager {
    config: CacheConfig,
    items: Vec<CachedItem>,
    next_sequence: u64,
}

impl CacheManager {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            next_sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&CachedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn items(&self) -> &[CachedItem] {
        &self.items
    }

    /// 100 when just cached, halving every half-life. Strictly decreasing with age.
    pub fn freshness(&self, item: &CachedItem, now: DateTime<Utc>) -> f32 {
        let half_lives = item.age_hours(now) / self.config.freshness_half_life_hours;
        (100.0 * 0.5_f64.powf(half_lives)) as f32
    }

    /// Freshness times relevance, 0-100.
    pub fn score(&self, item: &CachedItem, now: DateTime<Utc>) -> f32 {
        self.freshness(item, now) * item.relevance / 100.0
    }

    /// Insert or refresh an item, evicting the lowest scorers while over
    /// capacity. Returns the evicted ids.
    pub fn insert(&mut self, mut item: CachedItem, now: DateTime<Utc>) -> Vec<String> {
        item.sequence = self.next_sequence;
        self.next_sequence += 1;

        match self.items.iter().position(|i| i.id == item.id) {
            Some(index) => {
                item.served_count = self.items[index].served_count;
                self.items[index] = item;
            }
            None => self.items.push(item),
        }

        let mut evicted = Vec::new();
        while self.items.len() > self.config.capacity {
            let Some(index) = self.lowest_index(now) else {
                break;
            };
            let removed = self.items.remove(index);
            debug!(id = %removed.id, score = self.score(&removed, now), "evicted cached item");
            evicted.push(removed.id);
        }
        evicted
    }

    /// Lowest score; among equal scores the oldest insertion goes first.
    fn lowest_index(&self, now: DateTime<Utc>) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                self.score(a, now)
                    .partial_cmp(&self.score(b, now))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.sequence.cmp(&b.sequence))
            })
            .map(|(index, _)| index)
    }

    /// Drop items below the quality floor or past the maximum age.
    pub fn prune(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let floor = self.config.quality_floor;
        let max_age = self.config.max_age_hours;
        let mut removed = Vec::new();
        self.items.retain(|item| {
            let keep = item.quality >= floor && item.age_hours(now) <= max_age;
            if !keep {
                removed.push(item.id.clone());
            }
            keep
        });
        if !removed.is_empty() {
            info!(removed = removed.len(), remaining = self.items.len(), "pruned cache");
        }
        removed
    }

    /// Serve up to `count` items, best score first. Each serve lowers an
    /// item's rank so repeated cycles rotate through the cache.
    pub fn serve(&mut self, count: usize, now: DateTime<Utc>) -> Vec<CachedItem> {
        self.serve_matching(count, now, |_| true)
    }

    /// Like [`serve`](Self::serve), considering only items `keep` accepts.
    pub fn serve_matching(
        &mut self,
        count: usize,
        now: DateTime<Utc>,
        keep: impl Fn(&CachedItem) -> bool,
    ) -> Vec<CachedItem> {
        let mut ranked: Vec<(usize, f32)> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| keep(item))
            .map(|(index, item)| (index, self.score(item, now) / (1.0 + item.served_count as f32)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let picked: Vec<usize> = ranked.into_iter().take(count).map(|(index, _)| index).collect();
        picked
            .into_iter()
            .map(|index| {
                let item = &mut self.items[index];
                item.served_count += 1;
                item.clone()
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Serialize to the versioned JSON snapshot.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = CacheSnapshot {
            version: CACHE_SNAPSHOT_VERSION,
            items: self.items.clone(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Parse a snapshot, replacing the current contents.
    pub fn restore_json(&mut self, json: &str) -> Result<usize> {
        let snapshot: CacheSnapshot = serde_json::from_str(json)?;
        if snapshot.version != CACHE_SNAPSHOT_VERSION {
            return Err(NewsError::CacheVersion(snapshot.version));
        }
        self.items = snapshot.items;
        self.items.sort_by_key(|i| i.sequence);
        self.next_sequence = self.items.iter().map(|i| i.sequence + 1).max().unwrap_or(0);
        Ok(self.items.len())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), items = self.items.len(), "saved cache");
        Ok(())
    }

    /// Load a snapshot from disk. A missing or corrupt file leaves the cache
    /// empty; the problem is logged, never returned.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(NewsError::from)
            .and_then(|json| self.restore_json(&json));
        match loaded {
            Ok(count) => {
                info!(path = %path.display(), items = count, "loaded cache");
                count
            }
            Err(NewsError::CacheIo(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file, starting empty");
                self.items.clear();
                0
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable cache");
                self.items.clear();
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cached(id: &str, relevance: f32, cached_at: DateTime<Utc>) -> CachedItem {
        CachedItem {
            id: id.into(),
            source: SourceKind::Live,
            headline: format!("Headline {}", id),
            summary: "Summary".into(),
            publisher: "Wire".into(),
            published_at: cached_at,
            category: EventCategory::Policy,
            keywords: vec!["bill".into()],
            relevance,
            controversy: 0.0,
            quality: 50.0,
            cached_at,
            served_count: 0,
            sequence: 0,
        }
    }

    fn small_cache(capacity: usize) -> CacheManager {
        CacheManager::new(CacheConfig {
            capacity,
            ..CacheConfig::default()
        })
    }

    #[test]
    fn test_freshness_strictly_decreases() {
        let cache = small_cache(10);
        let now = Utc::now();
        let item = cached("a", 50.0, now);
        let mut previous = f32::MAX;
        for hours in [0, 1, 5, 24, 48, 100] {
            let freshness = cache.freshness(&item, now + Duration::hours(hours));
            assert!(freshness < previous);
            previous = freshness;
        }
        assert!((cache.freshness(&item, now + Duration::hours(48)) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_eviction_removes_lowest_score() {
        let mut cache = small_cache(2);
        let now = Utc::now();
        cache.insert(cached("low", 10.0, now), now);
        cache.insert(cached("high", 90.0, now), now);
        let evicted = cache.insert(cached("mid", 50.0, now), now);

        assert_eq!(evicted, vec!["low".to_string()]);
        assert!(cache.contains("high"));
        assert!(cache.contains("mid"));
    }

    #[test]
    fn test_eviction_prefers_stale_items() {
        let mut cache = small_cache(1);
        let now = Utc::now();
        cache.insert(cached("old", 80.0, now - Duration::hours(96)), now);
        let evicted = cache.insert(cached("new", 40.0, now), now);
        assert_eq!(evicted, vec!["old".to_string()]);
    }

    #[test]
    fn test_prune_floor_and_age() {
        let mut cache = small_cache(10);
        let now = Utc::now();
        let mut poor = cached("poor", 50.0, now);
        poor.quality = 5.0;
        cache.insert(poor, now);
        cache.insert(cached("ancient", 50.0, now - Duration::hours(500)), now);
        cache.insert(cached("good", 50.0, now), now);

        let mut removed = cache.prune(now);
        removed.sort();
        assert_eq!(removed, vec!["ancient".to_string(), "poor".to_string()]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_serve_best_first_and_rotates() {
        let mut cache = small_cache(10);
        let now = Utc::now();
        cache.insert(cached("a", 40.0, now), now);
        cache.insert(cached("b", 80.0, now), now);

        let first = cache.serve(1, now);
        assert_eq!(first[0].id, "b");
        let second = cache.serve(1, now);
        assert_eq!(second[0].id, "a");
    }

    #[test]
    fn test_serve_matching_filters() {
        let mut cache = small_cache(10);
        let now = Utc::now();
        cache.insert(cached("a", 40.0, now), now);
        cache.insert(cached("b", 80.0, now), now);

        let served = cache.serve_matching(5, now, |item| item.id != "b");
        assert_eq!(served.len(), 1);
        assert_eq!(served[0].id, "a");
        assert_eq!(cache.get("b").unwrap().served_count, 0);
    }

    #[test]
    fn test_reinsert_refreshes_in_place() {
        let mut cache = small_cache(10);
        let now = Utc::now();
        cache.insert(cached("a", 40.0, now - Duration::hours(10)), now);
        cache.insert(cached("a", 40.0, now), now);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().cached_at, now);
    }

    #[test]
    fn test_json_snapshot_restores() {
        let mut cache = small_cache(10);
        let now = Utc::now();
        cache.insert(cached("a", 40.0, now), now);
        cache.insert(cached("b", 60.0, now), now);
        let json = cache.to_json().unwrap();

        let mut restored = small_cache(10);
        assert_eq!(restored.restore_json(&json).unwrap(), 2);
        assert_eq!(restored.items()[0].id, "a");
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut cache = small_cache(10);
        let err = cache.restore_json(r#"{"version": 99, "items": []}"#).unwrap_err();
        assert!(matches!(err, NewsError::CacheVersion(99)));
    }
}
