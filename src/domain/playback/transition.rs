//! Playback Context - 片段结束后的跳转规则

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 播放模式
///
/// repeat 与 shuffle 是两个独立开关，不做互斥校验；
/// 两者同时打开时 repeat 优先。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackMode {
    pub repeat: bool,
    pub shuffle: bool,
}

/// 片段自然结束后的下一步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndedTransition {
    /// 重播当前片段
    Replay(usize),
    /// 随机跳到某个片段（可能就是当前片段）
    Shuffle(usize),
    /// 顺序前进
    Advance(usize),
    /// 已到末尾，停止播放
    Finish,
}

impl EndedTransition {
    /// 需要播放的索引
    pub fn target(&self) -> Option<usize> {
        match *self {
            EndedTransition::Replay(i) | EndedTransition::Shuffle(i) | EndedTransition::Advance(i) => {
                Some(i)
            }
            EndedTransition::Finish => None,
        }
    }
}

/// 计算片段结束后的跳转
pub fn on_segment_ended<R: Rng + ?Sized>(
    mode: PlaybackMode,
    current: usize,
    len: usize,
    rng: &mut R,
) -> EndedTransition {
    if len == 0 {
        return EndedTransition::Finish;
    }
    if mode.repeat {
        return EndedTransition::Replay(current);
    }
    if mode.shuffle {
        return EndedTransition::Shuffle(rng.gen_range(0..len));
    }
    if current + 1 < len {
        EndedTransition::Advance(current + 1)
    } else {
        EndedTransition::Finish
    }
}
