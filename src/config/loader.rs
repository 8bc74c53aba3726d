//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `LECTOR_BACKEND__BASE_URL=http://books.internal/api`
/// - `LECTOR_CACHE__CAPACITY=20`
/// - `LECTOR_PLAYER__BOOK_ID=abc123`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("backend.base_url", "http://localhost:8080/api")?
        .set_default("backend.timeout_secs", 30)?
        .set_default("cache.capacity", 10)?
        .set_default("prefetch.window", 3)?
        .set_default("prefetch.prime_count", 3)?
        .set_default("transport.skip_secs", 10.0)?
        .set_default("transport.speed", 1.0)?
        .set_default("transport.volume", 1.0)?
        .set_default("sink.tick_ms", 250)?
        .set_default("sink.segment_secs", 30.0)?
        .set_default("player.autoplay", true)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 前缀: LECTOR_
    // 层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("LECTOR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.backend.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Backend base URL cannot be empty".to_string(),
        ));
    }

    if config.cache.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Cache capacity must be at least 1".to_string(),
        ));
    }

    if config.transport.skip_secs <= 0.0 {
        return Err(ConfigError::ValidationError(
            "Skip interval must be positive".to_string(),
        ));
    }

    if config.transport.speed <= 0.0 {
        return Err(ConfigError::ValidationError(
            "Playback speed must be positive".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.transport.volume) {
        return Err(ConfigError::ValidationError(format!(
            "Volume must be within [0, 1], got {}",
            config.transport.volume
        )));
    }

    if config.sink.tick_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Sink tick cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Backend: {}", config.backend.base_url);
    tracing::info!("Backend Timeout: {}s", config.backend.timeout_secs);
    tracing::info!("Cache Capacity: {}", config.cache.capacity);
    tracing::info!(
        "Prefetch Window: {} (prime {})",
        config.prefetch.window,
        config.prefetch.prime_count
    );
    tracing::info!(
        "Transport: skip {}s, speed {}, volume {}",
        config.transport.skip_secs,
        config.transport.speed,
        config.transport.volume
    );
    tracing::info!("Sink Tick: {}ms", config.sink.tick_ms);
    if let Some(book_id) = &config.player.book_id {
        tracing::info!("Book: {}", book_id);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
