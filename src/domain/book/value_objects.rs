//! Book Context - Value Objects

use serde::{Deserialize, Serialize};

use super::BookError;

/// 书籍唯一标识（由后端分配）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// 音频片段唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SegmentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// 书籍处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    /// 等待处理
    #[default]
    Pending,
    /// 正在提取文本 / 合成语音
    Processing,
    /// 已就绪
    Ready,
    /// 文本提取或语音合成失败
    Error,
    /// 无法识别的状态值
    #[serde(other)]
    Unknown,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Pending => "pending",
            BookStatus::Processing => "processing",
            BookStatus::Ready => "ready",
            BookStatus::Error => "error",
            BookStatus::Unknown => "unknown",
        }
    }
}

/// 音频片段生成状态
///
/// 由外部合成流水线推进：pending -> processing -> completed / error，
/// 空文本片段直接标记为 skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
    Skipped,
    /// 无法识别的状态值，按不可播放处理
    #[serde(other)]
    Unknown,
}

impl SegmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentStatus::Pending => "pending",
            SegmentStatus::Processing => "processing",
            SegmentStatus::Completed => "completed",
            SegmentStatus::Error => "error",
            SegmentStatus::Skipped => "skipped",
            SegmentStatus::Unknown => "unknown",
        }
    }

    /// 只有 completed 的片段可以播放
    pub fn is_playable(&self) -> bool {
        matches!(self, SegmentStatus::Completed)
    }
}

/// 允许上传的文件类型
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// 用户选择的待上传文件
///
/// 不变量:
/// - 只接受 PDF（其它输入无法产生音频）
/// - 文件名非空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSelection {
    file_name: String,
}

impl PdfSelection {
    pub fn new(file_name: impl Into<String>, content_type: &str) -> Result<Self, BookError> {
        let file_name = file_name.into();
        if content_type != PDF_CONTENT_TYPE {
            return Err(BookError::InvalidSelection(format!(
                "expected {}, got {}",
                PDF_CONTENT_TYPE, content_type
            )));
        }
        if file_name.trim().is_empty() {
            return Err(BookError::InvalidSelection("empty file name".to_string()));
        }
        Ok(Self { file_name })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// 书名：去掉末尾的 `.pdf` 扩展名
    pub fn title(&self) -> &str {
        self.file_name
            .strip_suffix(".pdf")
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.file_name)
    }
}
