//! Playback Context - 播放状态快照

use serde::Serialize;

use super::{ActiveSegmentList, PlaybackMode};
use crate::domain::book::{AudioSegment, BookId};

/// 播放状态
///
/// 由播放器在每次变更后生成的只读快照。
/// `current_index` 仅在片段列表非空时有值。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub book_id: Option<BookId>,
    pub segments: ActiveSegmentList,
    pub current_index: Option<usize>,
    pub is_playing: bool,
    /// 当前位置（秒）
    pub current_time: f64,
    /// 当前片段时长（秒），未知时为 0
    pub duration: f64,
    pub speed: f64,
    pub volume: f64,
    #[serde(flatten)]
    pub mode: PlaybackMode,
    /// 当前片段进度百分比 [0, 100]
    pub progress: f64,
}

impl PlaybackState {
    pub fn current_segment(&self) -> Option<&AudioSegment> {
        self.current_index.and_then(|i| self.segments.get(i))
    }
}

/// 进度百分比：时长未知时为 0
pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    if duration > 0.0 && duration.is_finite() {
        current_time / duration * 100.0
    } else {
        0.0
    }
}
