//! Book Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BookStatus, SegmentId, SegmentStatus};

/// 书籍
///
/// 后端 `GET /books` 返回的记录，字段使用 camelCase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// 只有 ID 的书籍引用（上传刚完成、元数据尚未拉取时使用）
    pub fn from_id(id: BookId) -> Self {
        Self {
            id,
            title: String::new(),
            author: String::new(),
            cover_url: String::new(),
            file_url: String::new(),
            status: BookStatus::Pending,
            current_page: None,
            page_count: None,
            language: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// 音频片段 - 最小播放单位
///
/// 不变量:
/// - 被核心读取后不再修改
/// - 只有 status == completed 时 audio_url 可用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSegment {
    pub id: SegmentId,
    pub book_id: BookId,
    /// 片段对应的文本
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub audio_url: String,
    pub status: SegmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AudioSegment {
    pub fn new(
        id: impl Into<String>,
        book_id: BookId,
        content: impl Into<String>,
        audio_url: impl Into<String>,
        status: SegmentStatus,
    ) -> Self {
        Self {
            id: SegmentId::new(id),
            book_id,
            content: content.into(),
            audio_url: audio_url.into(),
            status,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.status.is_playable()
    }
}
