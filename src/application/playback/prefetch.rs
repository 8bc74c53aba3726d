//! Prefetch Scheduler - 前向预加载窗口
//!
//! 每次当前索引变化时预加载后续若干片段；预加载不阻塞播放，
//! 未命中缓存的片段在播放时直接走网络加载。

use std::ops::Range;

use super::ResourceCache;
use crate::domain::playback::ActiveSegmentList;

/// 默认前向窗口大小
pub const DEFAULT_PREFETCH_WINDOW: usize = 3;

/// 默认加载书籍时预热的片段数
pub const DEFAULT_PRIME_COUNT: usize = 3;

/// 预加载调度器
#[derive(Debug, Clone, Copy)]
pub struct PrefetchScheduler {
    window: usize,
    prime_count: usize,
}

impl PrefetchScheduler {
    pub fn new(window: usize, prime_count: usize) -> Self {
        Self { window, prime_count }
    }

    /// 前向窗口 `[current+1, current+window]`，裁剪到列表范围
    pub fn window_for(&self, current: usize, len: usize) -> Range<usize> {
        let start = current.saturating_add(1).min(len);
        let end = current.saturating_add(1).saturating_add(self.window).min(len);
        start..end
    }

    /// 当前索引变化后预加载前向窗口，返回新发起的加载数
    pub fn on_index_changed(
        &self,
        segments: &ActiveSegmentList,
        current: usize,
        cache: &mut ResourceCache,
    ) -> usize {
        let range = self.window_for(current, segments.len());
        let started = Self::preload_range(segments, range.clone(), cache);
        tracing::debug!(
            current = current,
            window_start = range.start,
            window_end = range.end,
            started = started,
            "Prefetch window scheduled"
        );
        started
    }

    /// 加载书籍时预热前几个片段
    pub fn prime(&self, segments: &ActiveSegmentList, cache: &mut ResourceCache) -> usize {
        let end = self.prime_count.min(segments.len());
        Self::preload_range(segments, 0..end, cache)
    }

    fn preload_range(
        segments: &ActiveSegmentList,
        range: Range<usize>,
        cache: &mut ResourceCache,
    ) -> usize {
        segments
            .range(range.start, range.end)
            .iter()
            .filter(|segment| cache.preload(&segment.audio_url, &segment.id))
            .count()
    }
}

impl Default for PrefetchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PREFETCH_WINDOW, DEFAULT_PRIME_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::playback::testing::{completed_segments, ManualLoader};
    use crate::domain::book::SegmentId;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn setup(n: usize) -> (ActiveSegmentList, ResourceCache, Arc<ManualLoader>) {
        let loader = Arc::new(ManualLoader::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let cache = ResourceCache::new(10, loader.clone(), tx);
        (ActiveSegmentList::from_manifest(completed_segments("b", n)), cache, loader)
    }

    #[test]
    fn test_window_is_clipped() {
        let scheduler = PrefetchScheduler::default();
        assert_eq!(scheduler.window_for(0, 10), 1..4);
        assert_eq!(scheduler.window_for(7, 10), 8..10);
        assert_eq!(scheduler.window_for(9, 10), 10..10);
        assert_eq!(scheduler.window_for(0, 0), 0..0);
    }

    #[test]
    fn test_on_index_changed_preloads_next_three() {
        let (segments, mut cache, loader) = setup(10);
        let scheduler = PrefetchScheduler::default();

        assert_eq!(scheduler.on_index_changed(&segments, 4, &mut cache), 3);

        assert_eq!(
            loader.started_ids(),
            vec![SegmentId::from("b-s5"), SegmentId::from("b-s6"), SegmentId::from("b-s7")]
        );
    }

    #[test]
    fn test_already_cached_segments_are_skipped() {
        let (segments, mut cache, loader) = setup(10);
        let scheduler = PrefetchScheduler::default();
        scheduler.on_index_changed(&segments, 0, &mut cache);

        assert_eq!(scheduler.on_index_changed(&segments, 1, &mut cache), 1);
        assert_eq!(loader.started().len(), 4);
    }

    #[test]
    fn test_prime_loads_first_segments() {
        let (segments, mut cache, loader) = setup(2);
        let scheduler = PrefetchScheduler::default();

        assert_eq!(scheduler.prime(&segments, &mut cache), 2);
        assert_eq!(loader.started_ids(), vec![SegmentId::from("b-s0"), SegmentId::from("b-s1")]);
    }
}
