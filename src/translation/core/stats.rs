//! 解析器统计信息（线程安全版本）

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// 解析器运行统计
///
/// 所有字段使用原子类型，解析路径上的更新不需要加锁。
#[derive(Debug, Default)]
pub struct ResolverStats {
    /// 单键解析次数
    pub resolutions: AtomicUsize,
    /// 批量解析次数
    pub batch_requests: AtomicUsize,
    /// 缓存命中次数
    pub cache_hits: AtomicUsize,
    /// 缓存未命中次数
    pub cache_misses: AtomicUsize,
    /// 存储命中次数
    pub store_hits: AtomicUsize,
    /// 提供者调用次数
    pub provider_calls: AtomicUsize,
    /// 提供者失败次数（不含超时）
    pub provider_failures: AtomicUsize,
    /// 提供者超时次数
    pub provider_timeouts: AtomicUsize,
    /// 等待其他解析结果的次数
    pub coalesced: AtomicUsize,
    /// 返回回退文本的次数
    pub fallbacks: AtomicUsize,
    /// 源文本缺失次数
    pub missing_source: AtomicUsize,
    /// 写入存储的记录数
    pub records_written: AtomicUsize,
    /// 存储错误次数
    pub store_errors: AtomicUsize,
}

macro_rules! counter {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl ResolverStats {
    counter! {
        inc_resolutions => resolutions,
        inc_batch_requests => batch_requests,
        inc_cache_hits => cache_hits,
        inc_cache_misses => cache_misses,
        inc_store_hits => store_hits,
        inc_provider_calls => provider_calls,
        inc_provider_failures => provider_failures,
        inc_provider_timeouts => provider_timeouts,
        inc_coalesced => coalesced,
        inc_missing_source => missing_source,
        inc_store_errors => store_errors,
    }

    /// 增加回退计数
    pub fn add_fallbacks(&self, count: usize) {
        self.fallbacks.fetch_add(count, Ordering::Relaxed);
    }

    /// 增加写入记录数
    pub fn add_records_written(&self, count: usize) {
        self.records_written.fetch_add(count, Ordering::Relaxed);
    }

    /// 获取统计数据的快照
    pub fn snapshot(&self) -> ResolverStatsSnapshot {
        ResolverStatsSnapshot {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            batch_requests: self.batch_requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            store_hits: self.store_hits.load(Ordering::Relaxed),
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            provider_timeouts: self.provider_timeouts.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            missing_source: self.missing_source.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        for counter in [
            &self.resolutions,
            &self.batch_requests,
            &self.cache_hits,
            &self.cache_misses,
            &self.store_hits,
            &self.provider_calls,
            &self.provider_failures,
            &self.provider_timeouts,
            &self.coalesced,
            &self.fallbacks,
            &self.missing_source,
            &self.records_written,
            &self.store_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// 统计数据的不可变快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverStatsSnapshot {
    pub resolutions: usize,
    pub batch_requests: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub store_hits: usize,
    pub provider_calls: usize,
    pub provider_failures: usize,
    pub provider_timeouts: usize,
    pub coalesced: usize,
    pub fallbacks: usize,
    pub missing_source: usize,
    pub records_written: usize,
    pub store_errors: usize,
}

impl ResolverStatsSnapshot {
    /// 缓存命中率
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
