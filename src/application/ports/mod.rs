//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_sink;
mod book_catalog;
mod resource_loader;

pub use audio_sink::{
    AudioSinkPort, LoadGeneration, MediaSource, SinkError, SinkEvent, SubscriptionId,
};
pub use book_catalog::{BookCatalogPort, CatalogError, CreateBookRequest, UploadReceipt};
pub use resource_loader::{
    LoadError, PreloadOutcome, ResourceHandle, ResourceLoaderPort, ResourceState,
};
