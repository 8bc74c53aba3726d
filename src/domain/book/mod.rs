//! Book Context - 书籍限界上下文
//!
//! 职责:
//! - 书籍与音频片段实体（由外部流水线产生，核心只读）
//! - 上传文件校验

mod entities;
mod errors;
mod value_objects;

pub use entities::{AudioSegment, Book};
pub use errors::BookError;
pub use value_objects::{BookId, BookStatus, PdfSelection, SegmentId, SegmentStatus, PDF_CONTENT_TYPE};
