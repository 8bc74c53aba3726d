//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：书籍目录

mod book_queries;

pub mod handlers;

pub use book_queries::*;
