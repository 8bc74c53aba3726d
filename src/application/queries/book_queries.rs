//! Book Queries

use crate::domain::book::BookId;

/// 获取书籍详情查询
#[derive(Debug, Clone)]
pub struct GetBook {
    pub book_id: BookId,
}

/// 列出所有书籍查询
#[derive(Debug, Clone)]
pub struct ListBooks;
