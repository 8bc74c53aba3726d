//! Resource Cache - 预加载音频资源的有界缓存
//!
//! 按插入顺序（FIFO）淘汰：`get` 不刷新条目位置，访问频率不影响淘汰顺序。

use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{PreloadOutcome, ResourceHandle, ResourceLoaderPort};
use crate::domain::book::SegmentId;

/// 默认缓存容量（条目数）
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub segment_id: SegmentId,
    pub handle: ResourceHandle,
    pub insertion_sequence: u64,
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub capacity: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub eviction_count: u64,
}

/// 资源缓存
///
/// 显式持有，随播放子系统一起构造；不同实例之间互不影响。
pub struct ResourceCache {
    capacity: usize,
    entries: IndexMap<SegmentId, CacheEntry>,
    next_sequence: u64,
    loader: Arc<dyn ResourceLoaderPort>,
    outcomes: mpsc::UnboundedSender<PreloadOutcome>,
    hit_count: u64,
    miss_count: u64,
    eviction_count: u64,
}

impl ResourceCache {
    /// 创建缓存，容量至少为 1
    pub fn new(
        capacity: usize,
        loader: Arc<dyn ResourceLoaderPort>,
        outcomes: mpsc::UnboundedSender<PreloadOutcome>,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity),
            next_sequence: 0,
            loader,
            outcomes,
            hit_count: 0,
            miss_count: 0,
            eviction_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &SegmentId) -> bool {
        self.entries.contains_key(id)
    }

    /// 查找资源句柄，不改变淘汰顺序
    pub fn get(&mut self, id: &SegmentId) -> Option<ResourceHandle> {
        match self.entries.get(id) {
            Some(entry) => {
                self.hit_count += 1;
                Some(entry.handle.clone())
            }
            None => {
                self.miss_count += 1;
                None
            }
        }
    }

    /// 插入资源句柄
    ///
    /// 已存在的 ID 原地替换（旧句柄被释放，插入顺序不变）；
    /// 否则在满容量时先淘汰最早插入的条目。
    pub fn put(&mut self, id: SegmentId, handle: ResourceHandle) {
        if let Some(entry) = self.entries.get_mut(&id) {
            if !entry.handle.same_resource(&handle) {
                entry.handle.release();
            }
            entry.handle = handle;
            tracing::debug!(segment_id = %id, "Cache entry replaced");
            return;
        }

        while self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let entry = CacheEntry {
            segment_id: id.clone(),
            handle,
            insertion_sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.entries.insert(id, entry);
    }

    /// 预加载音频资源，不开始播放
    ///
    /// 已缓存的 ID 直接忽略，返回是否发起了新的加载
    pub fn preload(&mut self, url: &str, id: &SegmentId) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }

        let handle = ResourceHandle::new(id.clone(), url);
        self.loader.begin_load(handle.clone(), self.outcomes.clone());
        self.put(id.clone(), handle);

        tracing::debug!(segment_id = %id, url = %url, "Preload started");
        true
    }

    /// 释放并清空所有条目
    pub fn clear(&mut self) {
        let count = self.entries.len();
        for (_, entry) in self.entries.drain(..) {
            entry.handle.release();
        }
        if count > 0 {
            tracing::debug!(released = count, "Cache cleared");
        }
    }

    /// 当前缓存的 ID（按插入顺序）
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.entries.keys().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            capacity: self.capacity,
            hit_count: self.hit_count,
            miss_count: self.miss_count,
            eviction_count: self.eviction_count,
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((id, entry)) = self.entries.shift_remove_index(0) {
            // 先释放资源引用，再移除
            entry.handle.release();
            self.eviction_count += 1;
            tracing::debug!(
                segment_id = %id,
                insertion_sequence = entry.insertion_sequence,
                "Evicted oldest cache entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::playback::testing::ManualLoader;

    fn cache(capacity: usize) -> (ResourceCache, Arc<ManualLoader>) {
        let loader = Arc::new(ManualLoader::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        (ResourceCache::new(capacity, loader.clone(), tx), loader)
    }

    fn id(s: &str) -> SegmentId {
        SegmentId::from(s)
    }

    fn handle(s: &str) -> ResourceHandle {
        ResourceHandle::new(id(s), format!("https://a/{s}.mp3"))
    }

    #[test]
    fn test_capacity_two_preload_scenario() {
        let (mut cache, loader) = cache(2);

        cache.preload("https://a/a.mp3", &id("a"));
        cache.preload("https://a/b.mp3", &id("b"));
        cache.preload("https://a/c.mp3", &id("c"));

        assert!(cache.get(&id("a")).is_none());
        assert!(cache.get(&id("b")).is_some());
        assert!(cache.get(&id("c")).is_some());
        assert_eq!(loader.started().len(), 3);
    }

    #[test]
    fn test_eviction_ignores_intervening_gets() {
        let (mut cache, _) = cache(3);
        cache.put(id("a"), handle("a"));
        cache.put(id("b"), handle("b"));
        cache.put(id("c"), handle("c"));

        // 频繁访问 a 也不能让它免于淘汰
        for _ in 0..5 {
            assert!(cache.get(&id("a")).is_some());
        }
        cache.put(id("d"), handle("d"));

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&id("a")));
        assert_eq!(cache.segment_ids(), vec![id("b"), id("c"), id("d")]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let (mut cache, _) = cache(4);
        for i in 0..25 {
            let key = format!("s{i}");
            cache.preload(&format!("https://a/{key}.mp3"), &id(&key));
            assert!(cache.len() <= 4);
        }
        assert_eq!(cache.stats().eviction_count, 21);
        assert_eq!(cache.segment_ids(), vec![id("s21"), id("s22"), id("s23"), id("s24")]);
    }

    #[test]
    fn test_eviction_releases_resource() {
        let (mut cache, _) = cache(1);
        let first = handle("a");
        cache.put(id("a"), first.clone());
        cache.put(id("b"), handle("b"));

        assert!(first.is_released());
    }

    #[test]
    fn test_preload_is_noop_when_present() {
        let (mut cache, loader) = cache(3);
        assert!(cache.preload("https://a/a.mp3", &id("a")));
        assert!(!cache.preload("https://a/other.mp3", &id("a")));

        assert_eq!(loader.started().len(), 1);
        assert_eq!(cache.get(&id("a")).map(|h| h.url().to_string()), Some("https://a/a.mp3".into()));
    }

    #[test]
    fn test_clear_releases_everything() {
        let (mut cache, _) = cache(5);
        let handles: Vec<_> = ["a", "b", "c"].iter().map(|s| handle(s)).collect();
        for h in &handles {
            cache.put(h.segment_id().clone(), h.clone());
        }

        cache.clear();

        assert!(cache.is_empty());
        for h in &handles {
            assert!(h.is_released());
            assert!(cache.get(h.segment_id()).is_none());
        }
    }

    #[test]
    fn test_put_existing_replaces_in_place() {
        let (mut cache, _) = cache(2);
        let old = handle("a");
        cache.put(id("a"), old.clone());
        cache.put(id("b"), handle("b"));

        let replacement = handle("a");
        cache.put(id("a"), replacement.clone());

        assert!(old.is_released());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.segment_ids(), vec![id("a"), id("b")]);
        assert!(cache.get(&id("a")).unwrap().same_resource(&replacement));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let (mut cache, _) = cache(0);
        cache.put(id("a"), handle("a"));
        cache.put(id("b"), handle("b"));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats_count_hits_and_misses() {
        let (mut cache, _) = cache(2);
        cache.put(id("a"), handle("a"));
        cache.get(&id("a"));
        cache.get(&id("zz"));

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
