//! Lector - 无界面有声书播放器
//!
//! 从后端加载一本书的音频片段，通过模拟输出端按顺序播放，
//! 直到列表播放完毕或收到 Ctrl-C。

use std::sync::Arc;

use lector::application::{
    GetBook, GetBookHandler, ListBooks, ListBooksHandler, PlaybackCommand,
};
use lector::config::{load_config, print_config, LogConfig};
use lector::domain::book::{Book, BookId};
use lector::infrastructure::adapters::{
    HttpBookCatalog, HttpBookCatalogConfig, HttpResourceLoader, SimulatedSink, SimulatedSinkConfig,
};
use lector::infrastructure::events::{EventPublisher, PlaybackEvent};
use lector::infrastructure::worker::PlaybackEngine;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Lector - 有声书播放器");
    print_config(&config);

    // 创建目录客户端
    let catalog_config = HttpBookCatalogConfig::new(config.backend.base_url.clone())
        .with_timeout(config.backend.timeout_secs);
    let catalog = Arc::new(HttpBookCatalog::new(catalog_config)?);

    let Some(book) = select_book(catalog.clone(), config.player.book_id.as_deref()).await? else {
        tracing::warn!("No books available, nothing to play");
        return Ok(());
    };

    // 创建事件发布器
    let event_publisher = EventPublisher::new().arc();
    let mut events = event_publisher.subscribe();

    // 创建播放引擎
    let sink = SimulatedSink::new(SimulatedSinkConfig {
        tick: config.sink.tick(),
        segment_secs: config.sink.segment_secs,
    });
    let (engine, handle) = PlaybackEngine::new(
        config.player_settings(),
        Box::new(sink),
        Arc::new(HttpResourceLoader::new()),
        catalog,
        event_publisher,
    );
    let engine_task = tokio::spawn(engine.run());

    let summary = handle.load_book(book).await?;
    if summary.ready_segments == 0 {
        tracing::warn!(book_id = %summary.book_id, "Book has no ready audio segments");
        handle.shutdown().await?;
        engine_task.await?;
        return Ok(());
    }

    let state = handle.snapshot().await?;
    if let Some(segment) = state.current_segment() {
        tracing::info!(segment_id = %segment.id, content = %segment.content, "First segment");
    }

    if config.player.autoplay {
        handle.dispatch(PlaybackCommand::Play).await?;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(PlaybackEvent::SegmentStarted { index, segment_id }) => {
                    tracing::info!(index = index, segment_id = %segment_id, "Now playing");
                }
                Ok(PlaybackEvent::ResourceLoadFailed { error }) => {
                    tracing::warn!(error = %error, "Segment failed to load");
                }
                Ok(PlaybackEvent::PlaybackFinished) => {
                    tracing::info!("Playback finished");
                    break;
                }
                Ok(PlaybackEvent::Position { current_time, duration, progress }) => {
                    tracing::trace!(current_time, duration, progress, "Position");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped = skipped, "Event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    let stats = handle.cache_stats().await?;
    tracing::info!(
        hits = stats.hit_count,
        misses = stats.miss_count,
        evictions = stats.eviction_count,
        "Cache statistics"
    );

    handle.shutdown().await?;
    engine_task.await?;
    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先于配置
fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},lector={}", log.level, log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 选择要播放的书：配置指定的书，否则目录中的第一本
async fn select_book(
    catalog: Arc<HttpBookCatalog>,
    book_id: Option<&str>,
) -> anyhow::Result<Option<Book>> {
    if let Some(id) = book_id {
        let book = GetBookHandler::new(catalog)
            .handle(GetBook {
                book_id: BookId::from(id),
            })
            .await?;
        return Ok(Some(book));
    }

    let books = ListBooksHandler::new(catalog).handle(ListBooks).await?;
    tracing::info!(count = books.len(), "Books in catalog");
    Ok(books.into_iter().next())
}
