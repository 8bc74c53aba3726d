//! Segment Sequencer - 片段切换状态机
//!
//! 持有可播放片段列表与当前索引，只通过 TransportController 的公开操作驱动播放。

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{ResourceCache, TransportController};
use crate::application::ports::ResourceState;
use crate::domain::book::AudioSegment;
use crate::domain::playback::{on_segment_ended, ActiveSegmentList, EndedTransition, PlaybackMode};

/// 片段序列器
pub struct SegmentSequencer {
    segments: ActiveSegmentList,
    current_index: usize,
    mode: PlaybackMode,
    rng: StdRng,
}

impl SegmentSequencer {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// 使用指定随机源（测试中用固定种子）
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            segments: ActiveSegmentList::default(),
            current_index: 0,
            mode: PlaybackMode::default(),
            rng,
        }
    }

    /// 整体替换片段列表，索引回到 0
    pub fn replace(&mut self, segments: ActiveSegmentList) {
        self.segments = segments;
        self.current_index = 0;
    }

    pub fn segments(&self) -> &ActiveSegmentList {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// 当前索引；列表为空时无效
    pub fn current_index(&self) -> Option<usize> {
        (!self.segments.is_empty()).then_some(self.current_index)
    }

    pub fn current_segment(&self) -> Option<&AudioSegment> {
        self.current_index().and_then(|i| self.segments.get(i))
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.mode.repeat = repeat;
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.mode.shuffle = shuffle;
    }

    /// 播放指定片段
    ///
    /// 越界索引被忽略（可能是列表替换前的过期 UI 操作），返回是否执行。
    /// 缓存命中时直接挂载预加载资源，否则从网络加载。
    pub fn play_segment(
        &mut self,
        index: usize,
        cache: &mut ResourceCache,
        transport: &mut TransportController,
    ) -> bool {
        let Some(segment) = self.segments.get(index) else {
            tracing::debug!(index = index, len = self.segments.len(), "Segment index out of range, ignored");
            return false;
        };

        // 预加载失败的资源不复用，改为直接从网络加载
        match cache.get(&segment.id) {
            Some(handle) if !matches!(handle.state(), ResourceState::Failed(_)) => {
                transport.attach(handle)
            }
            _ => transport.set_source(&segment.audio_url),
        }

        self.current_index = index;
        transport.play();

        tracing::debug!(index = index, segment_id = %segment.id, "Playing segment");
        true
    }

    /// 当前片段自然结束
    pub fn on_segment_ended(
        &mut self,
        cache: &mut ResourceCache,
        transport: &mut TransportController,
    ) -> EndedTransition {
        let transition = on_segment_ended(
            self.mode,
            self.current_index,
            self.segments.len(),
            &mut self.rng,
        );

        match transition.target() {
            Some(index) => {
                self.play_segment(index, cache, transport);
            }
            None => {
                transport.stop();
                tracing::info!(index = self.current_index, "Reached end of segment list");
            }
        }

        transition
    }

    /// 切到下一个片段开头；已在末尾时不变
    pub fn next(&mut self, cache: &mut ResourceCache, transport: &mut TransportController) -> bool {
        if self.segments.is_empty() || self.current_index + 1 >= self.segments.len() {
            return false;
        }
        self.play_segment(self.current_index + 1, cache, transport)
    }

    /// 切到上一个片段开头；已在开头时不变
    pub fn previous(&mut self, cache: &mut ResourceCache, transport: &mut TransportController) -> bool {
        if self.segments.is_empty() || self.current_index == 0 {
            return false;
        }
        self.play_segment(self.current_index - 1, cache, transport)
    }

    /// 清空列表（关闭时使用）
    pub fn clear(&mut self) {
        self.segments = ActiveSegmentList::default();
        self.current_index = 0;
    }
}

impl Default for SegmentSequencer {
    fn default() -> Self {
        Self::new()
    }
}
