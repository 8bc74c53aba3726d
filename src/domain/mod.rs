//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Book Context: 书籍与音频片段
//! - Playback Context: 片段列表、跳转规则、播放状态

pub mod book;
pub mod playback;
