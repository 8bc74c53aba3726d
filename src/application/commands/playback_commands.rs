//! Playback Commands - 播放控制命令

use serde::Deserialize;

/// 播放控制命令
///
/// 由播放引擎在单一事件循环中顺序执行
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackCommand {
    Play,
    Pause,
    Stop,
    SeekTo { time: f64 },
    SetSpeed { rate: f64 },
    SetVolume { volume: f64 },
    SkipForward,
    SkipBackward,
    PlaySegment { index: usize },
    SetRepeat { enabled: bool },
    SetShuffle { enabled: bool },
}

impl PlaybackCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::SeekTo { .. } => "seekTo",
            Self::SetSpeed { .. } => "setSpeed",
            Self::SetVolume { .. } => "setVolume",
            Self::SkipForward => "skipForward",
            Self::SkipBackward => "skipBackward",
            Self::PlaySegment { .. } => "playSegment",
            Self::SetRepeat { .. } => "setRepeat",
            Self::SetShuffle { .. } => "setShuffle",
        }
    }
}
