//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：播放控制与书籍上传

mod playback_commands;
mod upload_commands;

pub mod handlers;

pub use playback_commands::*;
pub use upload_commands::*;
