//! Playback Engine - 播放事件循环
//!
//! 单个 tokio 任务拥有全部播放状态。命令、输出端事件、预加载结果和
//! 清单获取结果都以消息形式进入同一个循环，按到达顺序处理。

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::application::commands::PlaybackCommand;
use crate::application::error::ApplicationError;
use crate::application::playback::{
    BookAudioLoader, CacheStats, LoadSummary, LoadedManifest, Player, PlayerNotice,
    PlayerSettings,
};
use crate::application::ports::{
    AudioSinkPort, BookCatalogPort, PreloadOutcome, ResourceLoaderPort, SinkEvent,
};
use crate::domain::book::{Book, BookId};
use crate::domain::playback::PlaybackState;
use crate::infrastructure::events::EventPublisher;

/// 命令队列容量
const COMMAND_QUEUE_CAPACITY: usize = 64;

type LoadReply = oneshot::Sender<Result<LoadSummary, ApplicationError>>;

/// 引擎命令
#[derive(Debug)]
pub enum EngineCommand {
    /// 加载书籍音频；更新的加载请求会取代尚未完成的请求
    LoadBook { book: Book, reply: LoadReply },
    /// 播放控制
    Playback(PlaybackCommand),
    /// 获取播放状态快照
    Snapshot {
        reply: oneshot::Sender<PlaybackState>,
    },
    /// 获取缓存统计
    CacheStats { reply: oneshot::Sender<CacheStats> },
    /// 关闭引擎
    Shutdown,
}

/// 后台清单获取的结果
struct ManifestResult {
    request: u64,
    book_id: BookId,
    result: Result<LoadedManifest, ApplicationError>,
}

/// 播放引擎
pub struct PlaybackEngine {
    player: Player,
    book_loader: BookAudioLoader,
    event_publisher: Arc<EventPublisher>,
    commands: mpsc::Receiver<EngineCommand>,
    sink_events: mpsc::UnboundedReceiver<SinkEvent>,
    preload_outcomes: mpsc::UnboundedReceiver<PreloadOutcome>,
    manifest_sender: mpsc::UnboundedSender<ManifestResult>,
    manifests: mpsc::UnboundedReceiver<ManifestResult>,
    /// 最新一次加载请求的序号
    latest_load: u64,
    pending_load: Option<(u64, LoadReply)>,
}

impl PlaybackEngine {
    pub fn new(
        settings: PlayerSettings,
        sink: Box<dyn AudioSinkPort>,
        resource_loader: Arc<dyn ResourceLoaderPort>,
        catalog: Arc<dyn BookCatalogPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> (Self, EngineHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (sink_tx, sink_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (manifest_tx, manifest_rx) = mpsc::unbounded_channel();

        let player = Player::new(&settings, sink, sink_tx, resource_loader, outcome_tx);

        let engine = Self {
            player,
            book_loader: BookAudioLoader::new(catalog),
            event_publisher,
            commands: command_rx,
            sink_events: sink_rx,
            preload_outcomes: outcome_rx,
            manifest_sender: manifest_tx,
            manifests: manifest_rx,
            latest_load: 0,
            pending_load: None,
        };

        (engine, EngineHandle { sender: command_tx })
    }

    /// 启动事件循环，直到收到 Shutdown 或所有句柄被丢弃
    pub async fn run(mut self) {
        tracing::info!(
            cache_capacity = self.player.cache().capacity(),
            "PlaybackEngine started"
        );

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(EngineCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                Some(event) = self.sink_events.recv() => self.handle_sink_event(event),
                Some(outcome) = self.preload_outcomes.recv() => self.handle_preload_outcome(outcome),
                Some(manifest) = self.manifests.recv() => self.handle_manifest(manifest),
            }
        }

        if let Some((_, reply)) = self.pending_load.take() {
            let _ = reply.send(Err(ApplicationError::EngineUnavailable));
        }
        self.player.teardown();
        tracing::info!("PlaybackEngine stopped");
    }

    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::LoadBook { book, reply } => self.begin_load(book, reply),
            EngineCommand::Playback(command) => {
                if let Some(index) = self.player.apply(command) {
                    self.publish_segment_started(index);
                }
                self.event_publisher.publish_state_changed(self.player.snapshot());
            }
            EngineCommand::Snapshot { reply } => {
                let _ = reply.send(self.player.snapshot());
            }
            EngineCommand::CacheStats { reply } => {
                let _ = reply.send(self.player.cache().stats());
            }
            EngineCommand::Shutdown => {}
        }
    }

    fn begin_load(&mut self, book: Book, reply: LoadReply) {
        self.latest_load += 1;
        let request = self.latest_load;

        if let Some((previous, superseded)) = self.pending_load.take() {
            tracing::debug!(request = previous, "Book load superseded");
            let _ = superseded.send(Err(ApplicationError::Superseded(format!(
                "load request {} replaced by {}",
                previous, request
            ))));
        }
        self.pending_load = Some((request, reply));

        tracing::info!(book_id = %book.id, request = request, "Loading book audio");

        let loader = self.book_loader.clone();
        let sender = self.manifest_sender.clone();
        tokio::spawn(async move {
            let book_id = book.id.clone();
            let result = loader.fetch(book).await;
            let _ = sender.send(ManifestResult {
                request,
                book_id,
                result,
            });
        });
    }

    fn handle_manifest(&mut self, manifest: ManifestResult) {
        if manifest.request != self.latest_load {
            tracing::debug!(
                book_id = %manifest.book_id,
                request = manifest.request,
                latest = self.latest_load,
                "Stale manifest discarded"
            );
            return;
        }
        let reply = self.pending_load.take().map(|(_, reply)| reply);

        let result = match manifest.result {
            Ok(loaded) => {
                let summary = self.player.install_book(loaded);
                self.event_publisher
                    .publish_book_loaded(summary.book_id.clone(), summary.ready_segments);
                self.event_publisher.publish_state_changed(self.player.snapshot());
                Ok(summary)
            }
            Err(e) => {
                self.event_publisher
                    .publish_book_load_failed(manifest.book_id, &e.to_string());
                Err(e)
            }
        };

        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    fn handle_sink_event(&mut self, event: SinkEvent) {
        let Some(notice) = self.player.handle_sink_event(event) else {
            return;
        };

        match notice {
            PlayerNotice::Position {
                current_time,
                duration,
            } => {
                let progress = self.player.transport().progress();
                self.event_publisher
                    .publish_position(current_time, duration, progress);
            }
            PlayerNotice::SegmentStarted { index, .. } => {
                self.publish_segment_started(index);
                self.event_publisher.publish_state_changed(self.player.snapshot());
            }
            PlayerNotice::Finished => {
                self.event_publisher.publish_playback_finished();
                self.event_publisher.publish_state_changed(self.player.snapshot());
            }
            PlayerNotice::LoadFailed(error) => {
                self.event_publisher.publish_resource_load_failed(&error);
            }
        }
    }

    fn handle_preload_outcome(&mut self, outcome: PreloadOutcome) {
        self.event_publisher
            .publish_preload_outcome(outcome.segment_id, &outcome.result);
    }

    fn publish_segment_started(&self, index: usize) {
        if let Some(segment) = self.player.sequencer().segments().get(index) {
            self.event_publisher
                .publish_segment_started(index, segment.id.clone());
        }
    }
}

/// 引擎句柄
///
/// 可克隆，向引擎任务发送命令并等待回复
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn send(&self, command: EngineCommand) -> Result<(), ApplicationError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| ApplicationError::EngineUnavailable)
    }

    /// 提交加载请求，返回结果接收端
    pub async fn request_load(
        &self,
        book: Book,
    ) -> Result<oneshot::Receiver<Result<LoadSummary, ApplicationError>>, ApplicationError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::LoadBook { book, reply }).await?;
        Ok(rx)
    }

    /// 加载书籍音频并等待完成
    pub async fn load_book(&self, book: Book) -> Result<LoadSummary, ApplicationError> {
        let rx = self.request_load(book).await?;
        rx.await.map_err(|_| ApplicationError::EngineUnavailable)?
    }

    /// 发送播放控制命令
    pub async fn dispatch(&self, command: PlaybackCommand) -> Result<(), ApplicationError> {
        self.send(EngineCommand::Playback(command)).await
    }

    pub async fn snapshot(&self) -> Result<PlaybackState, ApplicationError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| ApplicationError::EngineUnavailable)
    }

    pub async fn cache_stats(&self) -> Result<CacheStats, ApplicationError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::CacheStats { reply }).await?;
        rx.await.map_err(|_| ApplicationError::EngineUnavailable)
    }

    pub async fn shutdown(&self) -> Result<(), ApplicationError> {
        self.send(EngineCommand::Shutdown).await
    }
}
