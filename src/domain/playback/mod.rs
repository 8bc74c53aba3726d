//! Playback Context - 播放限界上下文
//!
//! 职责:
//! - 可播放片段列表（manifest 过滤）
//! - 片段结束后的跳转规则（顺序 / 单曲循环 / 随机）
//! - 播放状态快照

mod active_list;
mod state;
mod transition;

pub use active_list::ActiveSegmentList;
pub use state::{progress_percent, PlaybackState};
pub use transition::{on_segment_ended, EndedTransition, PlaybackMode};
