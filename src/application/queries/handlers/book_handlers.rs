//! Book Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::BookCatalogPort;
use crate::application::queries::{GetBook, ListBooks};
use crate::domain::book::Book;

/// GetBook Handler
pub struct GetBookHandler {
    catalog: Arc<dyn BookCatalogPort>,
}

impl GetBookHandler {
    pub fn new(catalog: Arc<dyn BookCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetBook) -> Result<Book, ApplicationError> {
        Ok(self.catalog.get_book(&query.book_id).await?)
    }
}

/// ListBooks Handler
pub struct ListBooksHandler {
    catalog: Arc<dyn BookCatalogPort>,
}

impl ListBooksHandler {
    pub fn new(catalog: Arc<dyn BookCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: ListBooks) -> Result<Vec<Book>, ApplicationError> {
        let books = self.catalog.list_books().await?;
        tracing::debug!(count = books.len(), "Books listed");
        Ok(books)
    }
}
