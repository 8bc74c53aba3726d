//! Lector - 有声书片段播放与预加载引擎
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 书籍与音频片段
//! - Playback Context: 活动片段列表、播放状态、结束切换规则
//!
//! 应用层 (application/):
//! - Ports: 端口定义（AudioSink, ResourceLoader, BookCatalog）
//! - Playback: 资源缓存、传输控制、片段序列、预加载调度
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 目录客户端、HTTP 资源加载器、模拟输出端
//! - Worker: PlaybackEngine 事件循环
//! - Events: 播放事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
