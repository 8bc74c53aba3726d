//! Worker Layer - Background Task Processing
//!
//! 实现 PlaybackEngine：拥有全部播放状态的单一事件循环

mod playback_engine;

pub use playback_engine::{EngineCommand, EngineHandle, PlaybackEngine};
