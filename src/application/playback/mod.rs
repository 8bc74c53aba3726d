//! 播放子系统
//!
//! - `resource_cache`: 按插入顺序淘汰的预加载资源缓存
//! - `transport`: 单输出端的播放控制
//! - `sequencer`: 片段选择与结束切换
//! - `prefetch`: 前向预加载窗口
//! - `book_loader`: 片段清单获取
//! - `player`: 以上组件的组合

mod book_loader;
mod player;
mod prefetch;
mod resource_cache;
mod sequencer;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use book_loader::{BookAudioLoader, LoadedManifest};
pub use player::{LoadSummary, Player, PlayerNotice, PlayerSettings};
pub use prefetch::{PrefetchScheduler, DEFAULT_PREFETCH_WINDOW, DEFAULT_PRIME_COUNT};
pub use resource_cache::{CacheEntry, CacheStats, ResourceCache, DEFAULT_CACHE_CAPACITY};
pub use sequencer::SegmentSequencer;
pub use transport::{SkipOutcome, TransportController, TransportSignal, DEFAULT_SKIP_SECS};
