//! Resource Loader Port - 音频资源预加载
//!
//! 资源句柄由缓存独占；加载器只负责在后台填充句柄并上报结果。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::book::SegmentId;

/// 资源加载错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Resource released while loading")]
    Released,
}

/// 资源状态
#[derive(Clone)]
pub enum ResourceState {
    /// 正在加载
    Loading,
    /// 已加载完成
    Ready(Arc<[u8]>),
    /// 加载失败
    Failed(LoadError),
    /// 已释放（被淘汰或缓存清空）
    Released,
}

impl ResourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Loading => "loading",
            ResourceState::Ready(_) => "ready",
            ResourceState::Failed(_) => "failed",
            ResourceState::Released => "released",
        }
    }
}

impl std::fmt::Debug for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceState::Ready(data) => write!(f, "Ready({} bytes)", data.len()),
            ResourceState::Failed(e) => write!(f, "Failed({})", e),
            other => f.write_str(other.as_str()),
        }
    }
}

struct ResourceSlot {
    segment_id: SegmentId,
    url: String,
    state: Mutex<ResourceState>,
}

/// 预加载资源句柄
///
/// 克隆只复制引用；释放后数据被丢弃，迟到的加载结果不会再写入。
#[derive(Clone)]
pub struct ResourceHandle {
    inner: Arc<ResourceSlot>,
}

impl ResourceHandle {
    pub fn new(segment_id: SegmentId, url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ResourceSlot {
                segment_id,
                url: url.into(),
                state: Mutex::new(ResourceState::Loading),
            }),
        }
    }

    pub fn segment_id(&self) -> &SegmentId {
        &self.inner.segment_id
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    fn lock(&self) -> MutexGuard<'_, ResourceState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ResourceState {
        self.lock().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), ResourceState::Ready(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(*self.lock(), ResourceState::Released)
    }

    /// 已加载的数据
    pub fn data(&self) -> Option<Arc<[u8]>> {
        match &*self.lock() {
            ResourceState::Ready(data) => Some(data.clone()),
            _ => None,
        }
    }

    /// 写入加载结果
    ///
    /// 句柄已释放时丢弃结果并返回 `Err(LoadError::Released)`
    pub fn complete(&self, result: Result<Vec<u8>, LoadError>) -> Result<usize, LoadError> {
        let mut state = self.lock();
        if matches!(*state, ResourceState::Released) {
            return Err(LoadError::Released);
        }
        match result {
            Ok(bytes) => {
                let size = bytes.len();
                *state = ResourceState::Ready(bytes.into());
                Ok(size)
            }
            Err(e) => {
                *state = ResourceState::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// 释放底层数据
    pub fn release(&self) {
        *self.lock() = ResourceState::Released;
    }

    /// 两个句柄是否指向同一资源
    pub fn same_resource(&self, other: &ResourceHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("segment_id", &self.inner.segment_id)
            .field("url", &self.inner.url)
            .field("state", &*self.lock())
            .finish()
    }
}

/// 预加载结果，成功时为字节数
#[derive(Debug, Clone, PartialEq)]
pub struct PreloadOutcome {
    pub segment_id: SegmentId,
    pub result: Result<usize, LoadError>,
}

/// Resource Loader Port
///
/// 开始一次后台加载，立即返回，不阻塞调用方。
/// 完成后填充句柄并把结果发送到 `outcomes`。
pub trait ResourceLoaderPort: Send + Sync {
    fn begin_load(&self, handle: ResourceHandle, outcomes: mpsc::UnboundedSender<PreloadOutcome>);
}
