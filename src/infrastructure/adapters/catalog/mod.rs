//! Book Catalog Adapters

mod http_book_catalog;

pub use http_book_catalog::{HttpBookCatalog, HttpBookCatalogConfig};
