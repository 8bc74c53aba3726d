//! Book Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("无效的文件选择: {0}")]
    InvalidSelection(String),
}
