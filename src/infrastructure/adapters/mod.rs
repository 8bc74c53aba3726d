//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod catalog;
pub mod loader;
pub mod sink;

pub use catalog::*;
pub use loader::*;
pub use sink::*;
