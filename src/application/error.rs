//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::CatalogError;
use crate::domain::book::{BookError, BookId};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 片段清单获取失败（不会创建播放状态）
    #[error("Failed to fetch audio segments for book {book_id}: {message}")]
    ManifestFetch { book_id: BookId, message: String },

    /// 用户选择的文件不符合要求
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 请求被更新的请求取代
    #[error("Superseded: {0}")]
    Superseded(String),

    /// 播放引擎已关闭
    #[error("Playback engine unavailable")]
    EngineUnavailable,
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建清单获取错误
    pub fn manifest_fetch(book_id: BookId, error: CatalogError) -> Self {
        Self::ManifestFetch {
            book_id,
            message: error.to_string(),
        }
    }

    /// 是否为清单获取失败
    pub fn is_manifest_fetch(&self) -> bool {
        matches!(self, Self::ManifestFetch { .. })
    }
}

impl From<CatalogError> for ApplicationError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::not_found("Book", id),
            other => Self::ExternalServiceError(other.to_string()),
        }
    }
}

impl From<BookError> for ApplicationError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::InvalidSelection(msg) => Self::InvalidSelection(msg),
        }
    }
}
