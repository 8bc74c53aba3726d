//! Playback Context - 可播放片段列表

use serde::Serialize;

use crate::domain::book::AudioSegment;

/// 当前书籍可播放的片段列表
///
/// 不变量:
/// - 只包含 status == completed 的片段
/// - 保持清单（manifest）中的原始顺序
/// - 每次加载整体替换，从不合并
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActiveSegmentList {
    segments: Vec<AudioSegment>,
}

impl ActiveSegmentList {
    /// 从完整清单构建，过滤掉未完成的片段
    pub fn from_manifest(manifest: Vec<AudioSegment>) -> Self {
        let segments = manifest.into_iter().filter(|s| s.is_playable()).collect();
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AudioSegment> {
        self.segments.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AudioSegment> {
        self.segments.iter()
    }

    /// 获取指定范围的片段，越界部分自动裁剪
    pub fn range(&self, start: usize, end: usize) -> &[AudioSegment] {
        let end = end.min(self.segments.len());
        let start = start.min(end);
        &self.segments[start..end]
    }
}
