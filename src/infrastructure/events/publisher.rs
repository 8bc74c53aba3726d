//! Event Publisher Implementation
//!
//! 播放事件广播，订阅者可随时加入 / 离开

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{LoadError, SinkError};
use crate::domain::book::{BookId, SegmentId};
use crate::domain::playback::PlaybackState;

/// 广播通道容量
const CHANNEL_CAPACITY: usize = 256;

/// 播放事件类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// 播放状态变更（播放 / 暂停 / 速率 / 音量 / 模式）
    StateChanged { state: PlaybackState },
    /// 位置更新
    Position {
        #[serde(rename = "currentTime")]
        current_time: f64,
        duration: f64,
        progress: f64,
    },
    /// 开始播放新片段
    SegmentStarted {
        index: usize,
        #[serde(rename = "segmentId")]
        segment_id: SegmentId,
    },
    /// 书籍音频已加载
    BookLoaded {
        #[serde(rename = "bookId")]
        book_id: BookId,
        #[serde(rename = "readySegments")]
        ready_segments: usize,
    },
    /// 书籍音频加载失败
    BookLoadFailed {
        #[serde(rename = "bookId")]
        book_id: BookId,
        error: String,
    },
    /// 预加载完成
    PreloadCompleted {
        #[serde(rename = "segmentId")]
        segment_id: SegmentId,
        size: usize,
    },
    /// 预加载失败
    PreloadFailed {
        #[serde(rename = "segmentId")]
        segment_id: SegmentId,
        error: String,
    },
    /// 当前音源加载失败
    ResourceLoadFailed { error: String },
    /// 列表播放完毕
    PlaybackFinished,
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<PlaybackEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅播放事件
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.channel.subscribe()
    }

    pub fn publish_state_changed(&self, state: PlaybackState) {
        self.publish(PlaybackEvent::StateChanged { state });
    }

    pub fn publish_position(&self, current_time: f64, duration: f64, progress: f64) {
        self.publish(PlaybackEvent::Position {
            current_time,
            duration,
            progress,
        });
    }

    pub fn publish_segment_started(&self, index: usize, segment_id: SegmentId) {
        self.publish(PlaybackEvent::SegmentStarted { index, segment_id });
    }

    pub fn publish_book_loaded(&self, book_id: BookId, ready_segments: usize) {
        self.publish(PlaybackEvent::BookLoaded {
            book_id,
            ready_segments,
        });
    }

    pub fn publish_book_load_failed(&self, book_id: BookId, error: &str) {
        self.publish(PlaybackEvent::BookLoadFailed {
            book_id,
            error: error.to_string(),
        });
    }

    /// 发布预加载结果；句柄已释放的结果不发布
    pub fn publish_preload_outcome(&self, segment_id: SegmentId, result: &Result<usize, LoadError>) {
        match result {
            Ok(size) => self.publish(PlaybackEvent::PreloadCompleted {
                segment_id,
                size: *size,
            }),
            Err(LoadError::Released) => {}
            Err(e) => self.publish(PlaybackEvent::PreloadFailed {
                segment_id,
                error: e.to_string(),
            }),
        }
    }

    pub fn publish_resource_load_failed(&self, error: &SinkError) {
        self.publish(PlaybackEvent::ResourceLoadFailed {
            error: error.to_string(),
        });
    }

    pub fn publish_playback_finished(&self) {
        self.publish(PlaybackEvent::PlaybackFinished);
    }

    fn publish(&self, event: PlaybackEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "Failed to publish playback event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish_book_loaded(BookId::from("b1"), 3);
        publisher.publish_playback_finished();

        assert!(matches!(rx.recv().await, Ok(PlaybackEvent::BookLoaded { ready_segments: 3, .. })));
        assert!(matches!(rx.recv().await, Ok(PlaybackEvent::PlaybackFinished)));
    }

    #[tokio::test]
    async fn test_released_preload_is_not_published() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish_preload_outcome(SegmentId::from("s1"), &Err(LoadError::Released));
        publisher.publish_preload_outcome(SegmentId::from("s2"), &Ok(10));

        assert!(matches!(
            rx.recv().await,
            Ok(PlaybackEvent::PreloadCompleted { size: 10, .. })
        ));
    }

    #[test]
    fn test_publish_without_receivers() {
        EventPublisher::new().publish_playback_finished();
    }

    #[test]
    fn test_event_json_shape() {
        let event = PlaybackEvent::SegmentStarted {
            index: 2,
            segment_id: SegmentId::from("s2"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "segmentStarted");
        assert_eq!(json["data"]["segmentId"], "s2");
    }
}
