//! 测试替身：记录型输出端、手动加载器、静态目录服务

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::application::ports::{
    AudioSinkPort, BookCatalogPort, CatalogError, CreateBookRequest, LoadError, LoadGeneration,
    MediaSource, PreloadOutcome, ResourceHandle, ResourceLoaderPort, SinkEvent, SubscriptionId,
    UploadReceipt,
};
use crate::domain::book::{AudioSegment, Book, BookId, BookStatus, SegmentId, SegmentStatus};

// ============================================================================
// ManualLoader
// ============================================================================

/// 只记录加载请求，由测试决定何时完成
#[derive(Default)]
pub struct ManualLoader {
    started: Mutex<Vec<(ResourceHandle, mpsc::UnboundedSender<PreloadOutcome>)>>,
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> Vec<ResourceHandle> {
        self.started.lock().unwrap().iter().map(|(h, _)| h.clone()).collect()
    }

    pub fn started_ids(&self) -> Vec<SegmentId> {
        self.started().iter().map(|h| h.segment_id().clone()).collect()
    }

    /// 完成所有挂起的加载
    pub fn complete_all(&self, result: Result<Vec<u8>, LoadError>) {
        let pending: Vec<_> = self.started.lock().unwrap().drain(..).collect();
        for (handle, outcomes) in pending {
            let outcome = handle.complete(result.clone());
            let _ = outcomes.send(PreloadOutcome {
                segment_id: handle.segment_id().clone(),
                result: outcome,
            });
        }
    }
}

impl ResourceLoaderPort for ManualLoader {
    fn begin_load(&self, handle: ResourceHandle, outcomes: mpsc::UnboundedSender<PreloadOutcome>) {
        self.started.lock().unwrap().push((handle, outcomes));
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

/// 输出端操作记录
#[derive(Debug, Default)]
pub struct SinkLog {
    pub loads: Vec<(MediaSource, LoadGeneration)>,
    pub playing: bool,
    pub position: f64,
    pub rate: f64,
    pub volume: f64,
    pub detached: bool,
    pub listeners: Vec<(SubscriptionId, mpsc::UnboundedSender<SinkEvent>)>,
}

/// 记录所有调用的输出端
pub struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
}

/// 测试侧观察 / 驱动 RecordingSink 的探针
#[derive(Clone)]
pub struct SinkProbe {
    log: Arc<Mutex<SinkLog>>,
}

impl RecordingSink {
    pub fn new() -> (Self, SinkProbe) {
        let log = Arc::new(Mutex::new(SinkLog {
            rate: 1.0,
            volume: 1.0,
            ..Default::default()
        }));
        (Self { log: log.clone() }, SinkProbe { log })
    }
}

impl SinkProbe {
    pub fn load_count(&self) -> usize {
        self.log.lock().unwrap().loads.len()
    }

    pub fn last_source(&self) -> Option<MediaSource> {
        self.log.lock().unwrap().loads.last().map(|(s, _)| s.clone())
    }

    pub fn last_generation(&self) -> LoadGeneration {
        self.log.lock().unwrap().loads.last().map(|(_, g)| *g).unwrap_or(0)
    }

    pub fn is_playing(&self) -> bool {
        self.log.lock().unwrap().playing
    }

    pub fn position(&self) -> f64 {
        self.log.lock().unwrap().position
    }

    pub fn rate(&self) -> f64 {
        self.log.lock().unwrap().rate
    }

    pub fn is_detached(&self) -> bool {
        self.log.lock().unwrap().detached
    }

    pub fn listener_count(&self) -> usize {
        self.log.lock().unwrap().listeners.len()
    }

    /// 向所有订阅者发送事件
    pub fn emit(&self, event: SinkEvent) {
        for (_, listener) in self.log.lock().unwrap().listeners.iter() {
            let _ = listener.send(event.clone());
        }
    }
}

impl AudioSinkPort for RecordingSink {
    fn load(&mut self, source: MediaSource, generation: LoadGeneration) {
        let mut log = self.log.lock().unwrap();
        log.loads.push((source, generation));
        log.playing = false;
        log.position = 0.0;
        log.detached = false;
    }

    fn play(&mut self) {
        self.log.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.log.lock().unwrap().playing = false;
    }

    fn seek(&mut self, position: f64) {
        self.log.lock().unwrap().position = position;
    }

    fn set_rate(&mut self, rate: f64) {
        self.log.lock().unwrap().rate = rate;
    }

    fn set_volume(&mut self, volume: f64) {
        self.log.lock().unwrap().volume = volume;
    }

    fn detach(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.detached = true;
        log.playing = false;
    }

    fn subscribe(&mut self, listener: mpsc::UnboundedSender<SinkEvent>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.log.lock().unwrap().listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut log = self.log.lock().unwrap();
        let before = log.listeners.len();
        log.listeners.retain(|(sub, _)| *sub != id);
        log.listeners.len() != before
    }
}

// ============================================================================
// StaticCatalog
// ============================================================================

/// 内存中的目录服务
#[derive(Default)]
pub struct StaticCatalog {
    books: Mutex<Vec<Book>>,
    manifests: Mutex<HashMap<BookId, Vec<AudioSegment>>>,
    created: Mutex<Vec<CreateBookRequest>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(self, book_id: &str, manifest: Vec<AudioSegment>) -> Self {
        let id = BookId::from(book_id);
        let mut book = Book::from_id(id.clone());
        book.title = format!("Book {book_id}");
        book.status = BookStatus::Ready;
        self.books.lock().unwrap().push(book);
        self.manifests.lock().unwrap().insert(id, manifest);
        self
    }

    pub fn created(&self) -> Vec<CreateBookRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookCatalogPort for StaticCatalog {
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.books.lock().unwrap().clone())
    }

    async fn get_book(&self, id: &BookId) -> Result<Book, CatalogError> {
        self.books
            .lock()
            .unwrap()
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn create_book(&self, request: CreateBookRequest) -> Result<UploadReceipt, CatalogError> {
        let id = BookId::new(format!("book-{}", self.created.lock().unwrap().len() + 1));
        self.created.lock().unwrap().push(request);
        Ok(UploadReceipt {
            id,
            status: BookStatus::Pending,
        })
    }

    async fn fetch_segments(&self, id: &BookId) -> Result<Vec<AudioSegment>, CatalogError> {
        self.manifests
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::ServiceError {
                status: 500,
                body: "manifest unavailable".to_string(),
            })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// 生成 `n` 个已完成的片段：`{book}-s0` ...
pub fn completed_segments(book_id: &str, n: usize) -> Vec<AudioSegment> {
    (0..n)
        .map(|i| {
            AudioSegment::new(
                format!("{book_id}-s{i}"),
                BookId::from(book_id),
                format!("Sentence {i}."),
                format!("https://cdn.example.com/{book_id}/{i}.mp3"),
                SegmentStatus::Completed,
            )
        })
        .collect()
}
