//! Upload Command Handlers

use std::sync::Arc;

use crate::application::commands::UploadBook;
use crate::application::error::ApplicationError;
use crate::application::ports::{BookCatalogPort, CreateBookRequest, UploadReceipt};
use crate::domain::book::PdfSelection;

/// UploadBook Handler - 校验文件并创建书籍记录
pub struct UploadBookHandler {
    catalog: Arc<dyn BookCatalogPort>,
}

impl UploadBookHandler {
    pub fn new(catalog: Arc<dyn BookCatalogPort>) -> Self {
        Self { catalog }
    }

    /// 非 PDF 文件直接拒绝，不会请求后端
    pub async fn handle(&self, command: UploadBook) -> Result<UploadReceipt, ApplicationError> {
        let selection = PdfSelection::new(command.file_name, &command.content_type)?;

        if command.file_url.trim().is_empty() {
            return Err(ApplicationError::InvalidSelection("missing file url".to_string()));
        }

        let request = CreateBookRequest {
            file_url: command.file_url,
            title: selection.title().to_string(),
        };

        let receipt = self.catalog.create_book(request).await?;

        tracing::info!(
            book_id = %receipt.id,
            title = %selection.title(),
            status = receipt.status.as_str(),
            "Book uploaded"
        );

        Ok(receipt)
    }
}
