//! Audio Sink Port - 音频输出端
//!
//! 定义唯一音频输出端的窄接口，具体实现在 infrastructure/adapters 层。
//! 所有位置 / 时长变化都通过事件异步上报。

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::ResourceHandle;

/// 每次加载音源时递增的代数，用于丢弃旧音源的迟到事件
pub type LoadGeneration = u64;

/// 音频输出错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unsupported source: {0}")]
    Unsupported(String),

    #[error("Resource released before playback: {0}")]
    Released(String),
}

/// 音源
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// 直接从网络加载
    Url(String),
    /// 使用缓存中已预加载的资源（借用，不拥有缓存条目）
    Resource(ResourceHandle),
}

impl MediaSource {
    pub fn url(&self) -> &str {
        match self {
            MediaSource::Url(url) => url,
            MediaSource::Resource(handle) => handle.url(),
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, MediaSource::Resource(_))
    }
}

/// 输出端生命周期事件
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// 时长已知（秒）
    DurationKnown {
        generation: LoadGeneration,
        duration: f64,
    },
    /// 播放位置周期上报（秒）
    PositionTick {
        generation: LoadGeneration,
        position: f64,
    },
    /// 当前音源播放结束
    Ended { generation: LoadGeneration },
    /// 音源加载失败
    LoadFailed {
        generation: LoadGeneration,
        error: SinkError,
    },
}

impl SinkEvent {
    pub fn generation(&self) -> LoadGeneration {
        match self {
            SinkEvent::DurationKnown { generation, .. }
            | SinkEvent::PositionTick { generation, .. }
            | SinkEvent::Ended { generation }
            | SinkEvent::LoadFailed { generation, .. } => *generation,
        }
    }
}

/// 事件订阅标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio Sink Port
///
/// 同一时刻只有一个音源处于活动状态。
/// - `load` 会停止当前播放并开始加载新音源，不自动播放
/// - 播放速率与音量在切换音源后保持不变
/// - 事件通过 `subscribe` 注册的通道上报，`unsubscribe` 后不再上报
pub trait AudioSinkPort: Send {
    /// 加载音源
    fn load(&mut self, source: MediaSource, generation: LoadGeneration);

    /// 开始 / 继续播放
    fn play(&mut self);

    /// 暂停
    fn pause(&mut self);

    /// 跳转到指定位置（秒），不做范围校验
    fn seek(&mut self, position: f64);

    /// 设置播放速率
    fn set_rate(&mut self, rate: f64);

    /// 设置音量 [0, 1]
    fn set_volume(&mut self, volume: f64);

    /// 卸载当前音源，释放对资源的引用
    fn detach(&mut self);

    /// 订阅生命周期事件
    fn subscribe(&mut self, listener: mpsc::UnboundedSender<SinkEvent>) -> SubscriptionId;

    /// 取消订阅，返回该订阅是否存在
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
