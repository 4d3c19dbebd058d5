//! 翻译解析器
//!
//! 单键解析的查找顺序：
//!
//! 1. 目标语言等于源语言时直接读取存储中的源文本
//! 2. 进程内缓存
//! 3. 记录存储
//! 4. 读取源文本并调用翻译提供者，成功后写回存储和缓存
//!
//! 任何失败都有文本回退，解析方法本身从不返回错误。
//! 同一 `(目标语言, 键)` 的并发未命中共享一次提供者调用；负责调用的一方
//! 在调用前会再查一次缓存和存储。

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::stats::{ResolverStats, ResolverStatsSnapshot};
use crate::translation::config::TranslationConfig;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::provider::{MachineTranslationProvider, RateLimiter};
use crate::translation::storage::{
    CacheKey, CacheStats, TranslationCache, TranslationRecord, TranslationRecordStore,
};

/// 解析结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// 目标语言即源语言，返回存储中的源文本
    SourceLanguage,
    CacheHit,
    StoreHit,
    /// 本次调用触发了远程翻译并写回
    Translated,
    /// 等待了另一个并发解析的远程翻译结果
    Coalesced,
    /// 提供者失败或超时，返回源文本
    ProviderFallback,
    /// 源文本缺失，返回原始键
    MissingSource,
}

impl ResolutionOutcome {
    /// 是否为回退文本
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            ResolutionOutcome::ProviderFallback | ResolutionOutcome::MissingSource
        )
    }
}

/// 单键解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub text: String,
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    pub fn new(text: impl Into<String>, outcome: ResolutionOutcome) -> Self {
        Self {
            text: text.into(),
            outcome,
        }
    }
}

type InFlight = Shared<BoxFuture<'static, Resolution>>;

pub(super) struct ResolverInner {
    pub(super) config: TranslationConfig,
    pub(super) store: Arc<dyn TranslationRecordStore>,
    pub(super) provider: Arc<dyn MachineTranslationProvider>,
    pub(super) cache: Arc<TranslationCache>,
    limiter: Arc<RateLimiter>,
    in_flight: DashMap<CacheKey, InFlight>,
    pub(super) stats: ResolverStats,
}

/// 翻译解析器
///
/// 克隆开销很小，所有克隆共享同一组缓存、限速器和并发登记表。
#[derive(Clone)]
pub struct TranslationResolver {
    pub(super) inner: Arc<ResolverInner>,
}

impl std::fmt::Debug for TranslationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationResolver")
            .field("source_lang", &self.inner.config.source_lang)
            .field("store", &self.inner.store.store_name())
            .field("provider", &self.inner.provider.provider_name())
            .field("cache_entries", &self.inner.cache.size())
            .finish()
    }
}

/// 解析器构建器
pub struct ResolverBuilder {
    config: TranslationConfig,
    store: Option<Arc<dyn TranslationRecordStore>>,
    provider: Option<Arc<dyn MachineTranslationProvider>>,
    cache: Option<Arc<TranslationCache>>,
    limiter: Option<Arc<RateLimiter>>,
}

impl ResolverBuilder {
    pub fn store(mut self, store: Arc<dyn TranslationRecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn MachineTranslationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// 注入外部缓存实例（默认每个解析器独占一个新缓存）
    pub fn cache(mut self, cache: Arc<TranslationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 注入共享限速器，多个解析器可以共用同一个提供者配额
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn build(self) -> TranslationResult<TranslationResolver> {
        self.config.validate()?;

        let store = self
            .store
            .ok_or_else(|| helpers::config_error("解析器缺少记录存储"))?;
        let provider = self
            .provider
            .ok_or_else(|| helpers::config_error("解析器缺少翻译提供者"))?;
        let cache = self.cache.unwrap_or_default();
        let limiter = self.limiter.unwrap_or_else(|| {
            Arc::new(RateLimiter::new(
                self.config.max_requests_per_second,
                self.config.rate_limit_burst,
            ))
        });

        info!(
            "翻译解析器已创建: 源语言={}, 存储={}, 提供者={}",
            self.config.source_lang,
            store.store_name(),
            provider.provider_name()
        );

        Ok(TranslationResolver {
            inner: Arc::new(ResolverInner {
                config: self.config,
                store,
                provider,
                cache,
                limiter,
                in_flight: DashMap::new(),
                stats: ResolverStats::default(),
            }),
        })
    }
}

/// 规范化语言代码
pub(super) fn normalize_language(language: &str) -> String {
    language.trim().to_lowercase()
}

impl TranslationResolver {
    pub fn builder(config: TranslationConfig) -> ResolverBuilder {
        ResolverBuilder {
            config,
            store: None,
            provider: None,
            cache: None,
            limiter: None,
        }
    }

    /// 使用默认缓存和限速器创建解析器
    pub fn new(
        config: TranslationConfig,
        store: Arc<dyn TranslationRecordStore>,
        provider: Arc<dyn MachineTranslationProvider>,
    ) -> TranslationResult<Self> {
        Self::builder(config).store(store).provider(provider).build()
    }

    /// 解析单个键，只返回文本
    pub async fn resolve(&self, key: &str, target_language: &str) -> String {
        self.resolve_detailed(key, target_language).await.text
    }

    /// 解析单个键并返回结果来源
    pub async fn resolve_detailed(&self, key: &str, target_language: &str) -> Resolution {
        let source = self.inner.config.source_lang.clone();
        self.resolve_from(key, target_language, &source).await
    }

    /// 以指定源语言解析单个键
    pub async fn resolve_from(
        &self,
        key: &str,
        target_language: &str,
        source_language: &str,
    ) -> Resolution {
        self.inner.stats.inc_resolutions();
        let target = normalize_language(target_language);
        let source = normalize_language(source_language);

        // 翻译到自身是空操作
        if target == source {
            return self.inner.resolve_source(key, &source).await;
        }

        if self.inner.config.cache_enabled {
            if let Some(text) = self.inner.cache.get(&target, key) {
                self.inner.stats.inc_cache_hits();
                return Resolution::new(text, ResolutionOutcome::CacheHit);
            }
            self.inner.stats.inc_cache_misses();
        }

        match self.inner.store.get(&target, key).await {
            Ok(Some(record)) => {
                self.inner.stats.inc_store_hits();
                if self.inner.config.cache_enabled {
                    self.inner.cache.put(&target, key, &record.translation_value);
                }
                return Resolution::new(record.translation_value, ResolutionOutcome::StoreHit);
            }
            Ok(None) => {}
            Err(e) => {
                self.inner.stats.inc_store_errors();
                helpers::log_error(&e.with_context(format!("读取 {}:{}", target, key)));
            }
        }

        self.translate_coalesced(key, &target, &source).await
    }

    /// 合并同一 `(目标语言, 键)` 的并发远程翻译
    async fn translate_coalesced(&self, key: &str, target: &str, source: &str) -> Resolution {
        let flight_key = CacheKey::new(target, key);

        let (flight, leader) = match self.inner.in_flight.entry(flight_key.clone()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let inner = Arc::clone(&self.inner);
                let source = source.to_string();
                let flight = async move {
                    let stored = inner
                        .lookup_written(&flight_key.key, &flight_key.language)
                        .await;
                    let resolution = match stored {
                        Some(resolution) => resolution,
                        None => {
                            inner
                                .translate_missing(&flight_key.key, &flight_key.language, &source)
                                .await
                        }
                    };
                    inner.in_flight.remove(&flight_key);
                    resolution
                }
                .boxed()
                .shared();
                entry.insert(flight.clone());
                (flight, true)
            }
        };

        let resolution = flight.await;
        if leader {
            return resolution;
        }

        self.inner.stats.inc_coalesced();
        debug!("等待并发翻译结果: {}:{}", target, key);
        match resolution.outcome {
            ResolutionOutcome::Translated => {
                Resolution::new(resolution.text, ResolutionOutcome::Coalesced)
            }
            _ => resolution,
        }
    }

    /// 清空进程内缓存，返回清除的条目数
    pub fn clear_cache(&self) -> usize {
        let cleared = self.inner.cache.clear();
        info!("翻译缓存已清空: {} 个条目", cleared);
        cleared
    }

    /// 管理端写入源语言文本
    ///
    /// 写入后从缓存中移除该键的所有语言条目，后续解析会重新读取存储。
    pub async fn save_source_text(
        &self,
        key: &str,
        value: &str,
        context: Option<String>,
    ) -> TranslationResult<()> {
        let source = self.inner.config.source_lang.clone();
        self.save_text(&source, key, value, context).await
    }

    /// 管理端写入任意语言的文本
    pub async fn save_text(
        &self,
        language: &str,
        key: &str,
        value: &str,
        context: Option<String>,
    ) -> TranslationResult<()> {
        let language = normalize_language(language);
        if key.trim().is_empty() {
            return Err(helpers::validation_error("翻译键不能为空"));
        }
        if language.is_empty() {
            return Err(helpers::validation_error("语言代码不能为空"));
        }

        let mut record = TranslationRecord::new(&language, key, value);
        record.context = context;
        self.inner.store.upsert(record).await.map_err(|e| {
            helpers::log_error(&e);
            e
        })?;

        let evicted = self.inner.cache.remove_key(key);
        info!("已保存 {}:{}，移除 {} 个缓存条目", language, key, evicted);
        Ok(())
    }

    /// 管理端删除某个键在所有语言下的记录，返回删除的记录数
    pub async fn delete_key(&self, key: &str) -> TranslationResult<usize> {
        if key.trim().is_empty() {
            return Err(helpers::validation_error("翻译键不能为空"));
        }

        let deleted = self.inner.store.delete_key(key).await.map_err(|e| {
            helpers::log_error(&e);
            e
        })?;
        let evicted = self.inner.cache.remove_key(key);
        info!("已删除键 {}: {} 条记录，{} 个缓存条目", key, deleted, evicted);
        Ok(deleted)
    }

    pub fn stats(&self) -> ResolverStatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.get_stats()
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.inner.cache
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.inner.config
    }

    pub fn source_language(&self) -> &str {
        &self.inner.config.source_lang
    }

    /// 当前正在进行的远程翻译数
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }
}

impl ResolverInner {
    async fn resolve_source(&self, key: &str, source: &str) -> Resolution {
        match self.store.get(source, key).await {
            Ok(Some(record)) => {
                Resolution::new(record.translation_value, ResolutionOutcome::SourceLanguage)
            }
            Ok(None) => {
                self.stats.inc_missing_source();
                debug!("源文本缺失: {}:{}", source, key);
                Resolution::new(key, ResolutionOutcome::MissingSource)
            }
            Err(e) => {
                self.stats.inc_store_errors();
                helpers::log_error(&e);
                Resolution::new(key, ResolutionOutcome::MissingSource)
            }
        }
    }

    /// 成为领导者后再查一次缓存和存储
    ///
    /// 调用方在前一个远程翻译写回之前读到未命中，而登记项在写回后已被移除，
    /// 这时译文已经存在，不能再次调用提供者。
    async fn lookup_written(&self, key: &str, target: &str) -> Option<Resolution> {
        if self.config.cache_enabled {
            if let Some(text) = self.cache.peek(target, key) {
                debug!("领导者复查命中缓存: {}:{}", target, key);
                return Some(Resolution::new(text, ResolutionOutcome::CacheHit));
            }
        }

        match self.store.get(target, key).await {
            Ok(Some(record)) => {
                self.stats.inc_store_hits();
                if self.config.cache_enabled {
                    self.cache.put(target, key, &record.translation_value);
                }
                debug!("领导者复查命中存储: {}:{}", target, key);
                Some(Resolution::new(
                    record.translation_value,
                    ResolutionOutcome::StoreHit,
                ))
            }
            Ok(None) => None,
            Err(e) => {
                self.stats.inc_store_errors();
                helpers::log_error(&e.with_context(format!("复查 {}:{}", target, key)));
                None
            }
        }
    }

    async fn translate_missing(&self, key: &str, target: &str, source: &str) -> Resolution {
        let source_record = match self.store.get(source, key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.stats.inc_missing_source();
                let error = TranslationError::MissingSourceText {
                    language: source.to_string(),
                    key: key.to_string(),
                };
                helpers::log_error(&error);
                return Resolution::new(key, ResolutionOutcome::MissingSource);
            }
            Err(e) => {
                self.stats.inc_store_errors();
                helpers::log_error(&e);
                return Resolution::new(key, ResolutionOutcome::MissingSource);
            }
        };

        let source_text = source_record.translation_value;
        let texts = vec![source_text.clone()];

        let translated = match self.call_provider(&texts, source, target).await {
            Ok(mut translated) => translated.pop().filter(|text| !text.trim().is_empty()),
            Err(e) => {
                helpers::log_error(&e);
                None
            }
        };

        let Some(text) = translated else {
            self.stats.add_fallbacks(1);
            warn!("翻译失败，使用源文本: {}:{}", target, key);
            return Resolution::new(source_text, ResolutionOutcome::ProviderFallback);
        };

        let context = source_record
            .context
            .unwrap_or_else(|| self.config.default_context.clone());
        let record = TranslationRecord::new(target, key, &text).with_context(context);

        match self.store.upsert(record).await {
            Ok(()) => {
                self.stats.add_records_written(1);
                if self.config.cache_enabled {
                    self.cache.put(target, key, &text);
                }
                debug!("已翻译并写回: {}:{}", target, key);
            }
            // 未持久化的译文不进缓存，下次解析会再次尝试写入
            Err(e) => {
                self.stats.inc_store_errors();
                helpers::log_error(&e);
            }
        }

        Resolution::new(text, ResolutionOutcome::Translated)
    }

    /// 经过限速和超时控制的提供者调用
    pub(super) async fn call_provider(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> TranslationResult<Vec<String>> {
        self.limiter.acquire().await;
        self.stats.inc_provider_calls();

        let limit = self.config.provider_timeout();
        match timeout(limit, self.provider.translate(texts, source, target)).await {
            Ok(Ok(translated)) if translated.len() == texts.len() => Ok(translated),
            Ok(Ok(translated)) => {
                self.stats.inc_provider_failures();
                Err(helpers::provider_error(format!(
                    "译文数量不匹配: 期望 {}，实际 {}",
                    texts.len(),
                    translated.len()
                )))
            }
            Ok(Err(e)) => {
                self.stats.inc_provider_failures();
                Err(e)
            }
            Err(_) => {
                self.stats.inc_provider_timeouts();
                Err(TranslationError::ProviderTimeout(limit))
            }
        }
    }
}
