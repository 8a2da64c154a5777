//! 渲染缓存模块
//!
//! 单次渲染过程内的翻译结果缓存。缓存键由 displaystyle 标志（`'1'`/`'0'`）
//! 和表达式拼接而成，只缓存成功的翻译结果；渲染结束后随引擎一起丢弃。

use std::collections::HashMap;

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_entries: usize,
}

impl CacheStats {
    /// 获取命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }
}

/// 单次渲染过程的翻译缓存
///
/// 渲染循环是单线程的，不需要锁。
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<String, String>,
    stats: CacheStats,
}

impl RenderCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 查找缓存的标记
    pub fn get(&mut self, expression: &str, display_mode: bool) -> Option<String> {
        self.stats.total_requests += 1;

        match self.entries.get(&cache_key(expression, display_mode)) {
            Some(markup) => {
                self.stats.cache_hits += 1;
                Some(markup.clone())
            }
            None => {
                self.stats.cache_misses += 1;
                None
            }
        }
    }

    /// 插入成功的翻译结果
    pub fn insert(&mut self, expression: &str, display_mode: bool, markup: String) {
        self.entries.insert(cache_key(expression, display_mode), markup);
        self.stats.total_entries = self.entries.len();
    }

    /// 获取缓存大小
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> CacheStats {
        self.stats.clone()
    }
}

/// 生成缓存键
pub fn cache_key(expression: &str, display_mode: bool) -> String {
    format!("{}{}", if display_mode { '1' } else { '0' }, expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic_operations() {
        let mut cache = RenderCache::new();

        cache.insert("a+b", false, "<math>a+b</math>".to_string());
        assert_eq!(cache.get("a+b", false), Some("<math>a+b</math>".to_string()));
        assert_eq!(cache.get("a-b", false), None);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_display_flag_is_part_of_key() {
        let mut cache = RenderCache::new();

        cache.insert("x", true, "display".to_string());
        assert_eq!(cache.get("x", true), Some("display".to_string()));
        assert_eq!(cache.get("x", false), None);
        assert_eq!(cache_key("x", true), "1x");
        assert_eq!(cache_key("x", false), "0x");
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = RenderCache::new();

        cache.get("x", false);
        cache.insert("x", false, "m".to_string());
        cache.get("x", false);

        let stats = cache.get_stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
