//! 存储模块
//!
//! 提供单次渲染过程内的缓存。

pub mod cache;

pub use cache::{cache_key, CacheStats, RenderCache};
