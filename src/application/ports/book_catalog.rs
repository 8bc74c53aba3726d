//! Book Catalog Port - 书籍目录服务
//!
//! 后端 REST 接口的抽象，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::book::{AudioSegment, Book, BookId, BookStatus};

/// 目录服务错误
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Book not found: {0}")]
    NotFound(String),
}

/// 创建书籍记录请求（文件已由外部托管服务上传）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub file_url: String,
    pub title: String,
}

/// 创建书籍记录的回执
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadReceipt {
    pub id: BookId,
    pub status: BookStatus,
}

/// Book Catalog Port
#[async_trait]
pub trait BookCatalogPort: Send + Sync {
    /// 获取所有书籍
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError>;

    /// 根据 ID 获取书籍
    async fn get_book(&self, id: &BookId) -> Result<Book, CatalogError>;

    /// 创建书籍记录
    async fn create_book(&self, request: CreateBookRequest) -> Result<UploadReceipt, CatalogError>;

    /// 获取书籍的完整片段清单（包含尚未就绪的片段）
    async fn fetch_segments(&self, id: &BookId) -> Result<Vec<AudioSegment>, CatalogError>;
}
