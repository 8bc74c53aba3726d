//! Player - 播放子系统组合根
//!
//! 把缓存、传输控制器、序列器和预加载调度器组合在一起。
//! 所有方法都是同步的，由单个事件循环驱动。

use std::sync::Arc;
use tokio::sync::mpsc;

use super::{
    BookAudioLoader, LoadedManifest, PrefetchScheduler, ResourceCache, SegmentSequencer,
    SkipOutcome, TransportController, TransportSignal, DEFAULT_CACHE_CAPACITY,
    DEFAULT_PREFETCH_WINDOW, DEFAULT_PRIME_COUNT, DEFAULT_SKIP_SECS,
};
use crate::application::commands::PlaybackCommand;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioSinkPort, PreloadOutcome, ResourceLoaderPort, SinkError, SinkEvent,
};
use crate::domain::book::{Book, BookId};
use crate::domain::playback::{EndedTransition, PlaybackState};

/// 播放器参数
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub cache_capacity: usize,
    pub prefetch_window: usize,
    pub prime_count: usize,
    pub skip_secs: f64,
    pub speed: f64,
    pub volume: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            prefetch_window: DEFAULT_PREFETCH_WINDOW,
            prime_count: DEFAULT_PRIME_COUNT,
            skip_secs: DEFAULT_SKIP_SECS,
            speed: 1.0,
            volume: 1.0,
        }
    }
}

/// 书籍加载结果
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub book_id: BookId,
    pub manifest_len: usize,
    pub ready_segments: usize,
    /// 加载时发起的预加载数
    pub preloads_started: usize,
}

/// 输出端事件处理后需要对外通知的变化
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotice {
    /// 位置或时长更新
    Position { current_time: f64, duration: f64 },
    /// 新片段开始播放（包括重播）
    SegmentStarted {
        index: usize,
        transition: EndedTransition,
    },
    /// 列表播放完毕
    Finished,
    /// 当前音源加载失败
    LoadFailed(SinkError),
}

/// 播放器
pub struct Player {
    book: Option<Book>,
    cache: ResourceCache,
    transport: TransportController,
    sequencer: SegmentSequencer,
    prefetch: PrefetchScheduler,
}

impl Player {
    pub fn new(
        settings: &PlayerSettings,
        sink: Box<dyn AudioSinkPort>,
        sink_events: mpsc::UnboundedSender<SinkEvent>,
        loader: Arc<dyn ResourceLoaderPort>,
        preload_outcomes: mpsc::UnboundedSender<PreloadOutcome>,
    ) -> Self {
        Self {
            book: None,
            cache: ResourceCache::new(settings.cache_capacity, loader, preload_outcomes),
            transport: TransportController::new(
                sink,
                sink_events,
                settings.speed,
                settings.volume,
                settings.skip_secs,
            ),
            sequencer: SegmentSequencer::new(),
            prefetch: PrefetchScheduler::new(settings.prefetch_window, settings.prime_count),
        }
    }

    /// 替换序列器（测试中注入固定随机源）
    pub fn with_sequencer(mut self, sequencer: SegmentSequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn transport(&self) -> &TransportController {
        &self.transport
    }

    pub fn sequencer(&self) -> &SegmentSequencer {
        &self.sequencer
    }

    pub fn current_index(&self) -> Option<usize> {
        self.sequencer.current_index()
    }

    /// 获取清单并装载新书
    pub async fn load_book_audio(
        &mut self,
        loader: &BookAudioLoader,
        book: Book,
    ) -> Result<LoadSummary, ApplicationError> {
        let loaded = loader.fetch(book).await?;
        Ok(self.install_book(loaded))
    }

    /// 装载已获取的清单
    ///
    /// 整体替换片段列表、索引归零、清空缓存、预热，
    /// 列表非空时把第一个片段设为音源（不自动播放）。
    pub fn install_book(&mut self, loaded: LoadedManifest) -> LoadSummary {
        let LoadedManifest {
            book,
            segments,
            manifest_len,
        } = loaded;

        self.sequencer.replace(segments);
        self.cache.clear();

        let mut preloads_started = self.prefetch.prime(self.sequencer.segments(), &mut self.cache);
        if let Some(index) = self.sequencer.current_index() {
            preloads_started +=
                self.prefetch
                    .on_index_changed(self.sequencer.segments(), index, &mut self.cache);
        }

        match self.sequencer.current_segment() {
            Some(first) => self.transport.set_source(&first.audio_url),
            None => self.transport.unload(),
        }

        let summary = LoadSummary {
            book_id: book.id.clone(),
            manifest_len,
            ready_segments: self.sequencer.len(),
            preloads_started,
        };

        tracing::info!(
            book_id = %book.id,
            ready_segments = summary.ready_segments,
            preloads_started = preloads_started,
            "Book audio loaded"
        );

        self.book = Some(book);
        summary
    }

    /// 执行播放命令，返回新开始播放的片段索引（如有）
    pub fn apply(&mut self, command: PlaybackCommand) -> Option<usize> {
        tracing::debug!(command = ?command, "Applying playback command");
        match command {
            PlaybackCommand::Play => {
                self.transport.play();
                None
            }
            PlaybackCommand::Pause => {
                self.transport.pause();
                None
            }
            PlaybackCommand::Stop => {
                self.transport.stop();
                None
            }
            PlaybackCommand::SeekTo { time } => {
                self.transport.seek_to(time);
                None
            }
            PlaybackCommand::SetSpeed { rate } => {
                self.transport.set_speed(rate);
                None
            }
            PlaybackCommand::SetVolume { volume } => {
                self.transport.set_volume(volume);
                None
            }
            PlaybackCommand::SkipForward => self.skip_forward(),
            PlaybackCommand::SkipBackward => self.skip_backward(),
            PlaybackCommand::PlaySegment { index } => self.play_segment(index),
            PlaybackCommand::SetRepeat { enabled } => {
                self.sequencer.set_repeat(enabled);
                None
            }
            PlaybackCommand::SetShuffle { enabled } => {
                self.sequencer.set_shuffle(enabled);
                None
            }
        }
    }

    /// 播放指定片段；越界时不变
    pub fn play_segment(&mut self, index: usize) -> Option<usize> {
        self.transition(|sequencer, cache, transport| sequencer.play_segment(index, cache, transport))
    }

    /// 快进 10 秒；不足时切到下一片段开头，已是最后一段则不变
    pub fn skip_forward(&mut self) -> Option<usize> {
        match self.transport.skip_forward() {
            SkipOutcome::InPlace => None,
            _ => self.transition(|sequencer, cache, transport| sequencer.next(cache, transport)),
        }
    }

    /// 快退 10 秒；不足时切到上一片段开头，已是第一段则不变
    pub fn skip_backward(&mut self) -> Option<usize> {
        match self.transport.skip_backward() {
            SkipOutcome::InPlace => None,
            _ => self.transition(|sequencer, cache, transport| sequencer.previous(cache, transport)),
        }
    }

    /// 处理输出端事件
    pub fn handle_sink_event(&mut self, event: SinkEvent) -> Option<PlayerNotice> {
        match self.transport.handle_event(event)? {
            TransportSignal::PositionChanged => Some(PlayerNotice::Position {
                current_time: self.transport.current_time(),
                duration: self.transport.duration(),
            }),
            TransportSignal::Ended => {
                let before = self.sequencer.current_index();
                let transition = self.sequencer.on_segment_ended(&mut self.cache, &mut self.transport);
                match transition.target() {
                    Some(index) => {
                        self.prefetch_if_moved(before);
                        Some(PlayerNotice::SegmentStarted { index, transition })
                    }
                    None => Some(PlayerNotice::Finished),
                }
            }
            TransportSignal::LoadFailed(error) => Some(PlayerNotice::LoadFailed(error)),
        }
    }

    /// 当前播放状态快照
    pub fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            book_id: self.book.as_ref().map(|b| b.id.clone()),
            segments: self.sequencer.segments().clone(),
            current_index: self.sequencer.current_index(),
            is_playing: self.transport.is_playing(),
            current_time: self.transport.current_time(),
            duration: self.transport.duration(),
            speed: self.transport.speed(),
            volume: self.transport.volume(),
            mode: self.sequencer.mode(),
            progress: self.transport.progress(),
        }
    }

    /// 关闭：退订输出端事件、释放缓存
    pub fn teardown(&mut self) {
        self.transport.teardown();
        self.cache.clear();
        self.sequencer.clear();
        self.book = None;
        tracing::debug!("Player torn down");
    }

    // 执行一次片段切换，索引变化时调度前向预加载
    fn transition<F>(&mut self, f: F) -> Option<usize>
    where
        F: FnOnce(&mut SegmentSequencer, &mut ResourceCache, &mut TransportController) -> bool,
    {
        let before = self.sequencer.current_index();
        if !f(&mut self.sequencer, &mut self.cache, &mut self.transport) {
            return None;
        }
        self.prefetch_if_moved(before);
        self.sequencer.current_index()
    }

    fn prefetch_if_moved(&mut self, before: Option<usize>) {
        let current = self.sequencer.current_index();
        if current == before {
            return;
        }
        if let Some(index) = current {
            self.prefetch
                .on_index_changed(self.sequencer.segments(), index, &mut self.cache);
        }
    }
}
