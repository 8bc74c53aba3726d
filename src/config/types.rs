//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::playback::{
    PlayerSettings, DEFAULT_CACHE_CAPACITY, DEFAULT_PREFETCH_WINDOW, DEFAULT_PRIME_COUNT,
    DEFAULT_SKIP_SECS,
};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 后端 REST 服务配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 预加载缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 预加载窗口配置
    #[serde(default)]
    pub prefetch: PrefetchConfig,

    /// 播放控制配置
    #[serde(default)]
    pub transport: TransportConfig,

    /// 模拟输出端配置
    #[serde(default)]
    pub sink: SinkConfig,

    /// 启动播放配置
    #[serde(default)]
    pub player: PlayerConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 播放器参数
    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            cache_capacity: self.cache.capacity,
            prefetch_window: self.prefetch.window,
            prime_count: self.prefetch.prime_count,
            skip_secs: self.transport.skip_secs,
            speed: self.transport.speed,
            volume: self.transport.volume,
        }
    }
}

/// 后端服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// API 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 最多保留的预加载资源数
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// 预加载配置
#[derive(Debug, Clone, Deserialize)]
pub struct PrefetchConfig {
    /// 当前片段之后预加载的片段数
    #[serde(default = "default_window")]
    pub window: usize,

    /// 加载书籍时预热的片段数
    #[serde(default = "default_prime_count")]
    pub prime_count: usize,
}

fn default_window() -> usize {
    DEFAULT_PREFETCH_WINDOW
}

fn default_prime_count() -> usize {
    DEFAULT_PRIME_COUNT
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            prime_count: default_prime_count(),
        }
    }
}

/// 播放控制配置
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// 快进/快退步长（秒）
    #[serde(default = "default_skip_secs")]
    pub skip_secs: f64,

    /// 初始播放速率
    #[serde(default = "default_unit")]
    pub speed: f64,

    /// 初始音量 [0, 1]
    #[serde(default = "default_unit")]
    pub volume: f64,
}

fn default_skip_secs() -> f64 {
    DEFAULT_SKIP_SECS
}

fn default_unit() -> f64 {
    1.0
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            skip_secs: default_skip_secs(),
            speed: default_unit(),
            volume: default_unit(),
        }
    }
}

/// 模拟输出端配置
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// 时钟间隔（毫秒）
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// 每个片段的模拟时长（秒）
    #[serde(default = "default_segment_secs")]
    pub segment_secs: f64,
}

fn default_tick_ms() -> u64 {
    250
}

fn default_segment_secs() -> f64 {
    30.0
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            segment_secs: default_segment_secs(),
        }
    }
}

impl SinkConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// 启动播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// 启动时加载的书籍，未设置时取目录中的第一本
    #[serde(default)]
    pub book_id: Option<String>,

    /// 加载后是否自动播放
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
}

fn default_autoplay() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            book_id: None,
            autoplay: default_autoplay(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8080/api");
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.prefetch.window, 3);
        assert_eq!(config.transport.skip_secs, 10.0);
        assert!(config.player.autoplay);
    }

    #[test]
    fn test_player_settings() {
        let mut config = AppConfig::default();
        config.cache.capacity = 4;
        config.transport.speed = 1.5;

        let settings = config.player_settings();
        assert_eq!(settings.cache_capacity, 4);
        assert_eq!(settings.speed, 1.5);
        assert_eq!(settings.prime_count, 3);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));
        assert_eq!(config.sink.tick(), Duration::from_millis(250));
    }
}
