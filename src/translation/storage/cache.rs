//! 翻译缓存模块
//!
//! 进程级的 `(目标语言, 翻译键) -> 文本` 映射。惰性填充，没有 TTL，
//! 只会在进程重启或显式清空时失效。

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

// ============================================================================
// 核心类型
// ============================================================================

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub language: String,
    pub key: String,
}

impl CacheKey {
    pub fn new(language: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            key: key.into(),
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_entries: usize,
    pub clears: u64,
}

/// 翻译缓存
///
/// 写入是简单的覆盖插入；同一 `(语言, 键)` 的并发写入值在语义上相同，
/// 后写者胜出即可。
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: DashMap<CacheKey, String>,
    hits: AtomicU64,
    misses: AtomicU64,
    clears: AtomicU64,
}

// ============================================================================
// 实现
// ============================================================================

impl TranslationCache {
    /// 创建新的翻译缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取缓存条目
    pub fn get(&self, language: &str, key: &str) -> Option<String> {
        let cache_key = CacheKey::new(language, key);
        match self.entries.get(&cache_key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 读取缓存条目（不计入命中统计）
    pub fn peek(&self, language: &str, key: &str) -> Option<String> {
        self.entries
            .get(&CacheKey::new(language, key))
            .map(|value| value.clone())
    }

    /// 插入缓存条目
    pub fn put(&self, language: &str, key: &str, value: impl Into<String>) {
        self.entries.insert(CacheKey::new(language, key), value.into());
    }

    /// 批量插入
    pub fn put_many<I, K, V>(&self, language: &str, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in items {
            self.entries
                .insert(CacheKey::new(language, key), value.into());
        }
    }

    /// 移除某个键在所有语言下的条目，返回移除数量
    pub fn remove_key(&self, key: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|cache_key, _| cache_key.key != key);
        before.saturating_sub(self.entries.len())
    }

    /// 清空缓存，返回清除的条目数
    pub fn clear(&self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        self.clears.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("翻译缓存已清空: {} 个条目", cleared);
        cleared
    }

    /// 检查是否包含指定键（不计入命中统计）
    pub fn contains(&self, language: &str, key: &str) -> bool {
        self.entries.contains_key(&CacheKey::new(language, key))
    }

    /// 获取缓存大小
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> CacheStats {
        let cache_hits = self.hits.load(Ordering::Relaxed);
        let cache_misses = self.misses.load(Ordering::Relaxed);
        CacheStats {
            total_requests: cache_hits + cache_misses,
            cache_hits,
            cache_misses,
            total_entries: self.entries.len(),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }

    /// 重置统计信息
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.clears.store(0, Ordering::Relaxed);
    }
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic_operations() {
        let cache = TranslationCache::new();

        cache.put("en", "header.catalog", "Catalog");
        assert_eq!(cache.get("en", "header.catalog"), Some("Catalog".to_string()));
        assert_eq!(cache.get("de", "header.catalog"), None);
        assert_eq!(cache.size(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("en", "header.catalog"), None);
    }

    #[test]
    fn test_cache_stats() {
        let cache = TranslationCache::new();
        cache.put("en", "greeting", "Hello");

        cache.get("en", "greeting");
        cache.get("en", "missing");

        let stats = cache.get_stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_peek_does_not_count() {
        let cache = TranslationCache::new();
        cache.put("en", "greeting", "Hello");

        assert_eq!(cache.peek("en", "greeting"), Some("Hello".to_string()));
        assert_eq!(cache.peek("de", "greeting"), None);
        assert_eq!(cache.get_stats().total_requests, 0);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = TranslationCache::new();
        cache.put("en", "greeting", "Hi");
        cache.put("en", "greeting", "Hello");
        assert_eq!(cache.get("en", "greeting"), Some("Hello".to_string()));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_remove_key_across_languages() {
        let cache = TranslationCache::new();
        cache.put_many("en", vec![("a", "A"), ("b", "B")]);
        cache.put("de", "a", "A-de");

        assert_eq!(cache.remove_key("a"), 2);
        assert!(!cache.contains("en", "a"));
        assert!(!cache.contains("de", "a"));
        assert!(cache.contains("en", "b"));
    }

    #[test]
    fn test_isolated_instances() {
        let first = TranslationCache::new();
        let second = TranslationCache::new();
        first.put("en", "greeting", "Hello");
        assert!(second.get("en", "greeting").is_none());
    }
}
