//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AudioSink、ResourceLoader、BookCatalog）
//! - playback: 播放子系统（缓存、传输控制、序列、预加载）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod playback;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::UploadBookHandler,
    PlaybackCommand,
    UploadBook,
};

pub use error::ApplicationError;

pub use playback::{
    BookAudioLoader, CacheStats, LoadSummary, LoadedManifest, Player, PlayerNotice,
    PlayerSettings, ResourceCache,
};

pub use ports::{
    // Audio sink
    AudioSinkPort,
    LoadGeneration,
    MediaSource,
    SinkError,
    SinkEvent,
    SubscriptionId,
    // Book catalog
    BookCatalogPort,
    CatalogError,
    CreateBookRequest,
    UploadReceipt,
    // Resource loader
    LoadError,
    PreloadOutcome,
    ResourceHandle,
    ResourceLoaderPort,
    ResourceState,
};

pub use queries::{
    handlers::{GetBookHandler, ListBooksHandler},
    GetBook,
    ListBooks,
};
