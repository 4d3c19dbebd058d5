// 集成测试公共模块
//
// 提供模拟翻译提供者、可注入故障的记录存储和解析器构建工具

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use catalog_i18n::translation::{
    BatchItem, InMemoryRecordStore, MachineTranslationProvider, TranslationConfig,
    TranslationError, TranslationRecord, TranslationRecordStore, TranslationResolver,
    TranslationResult,
};

/// 一次提供者调用的记录
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    pub texts: Vec<String>,
    pub source_language: String,
    pub target_language: String,
}

/// 模拟翻译提供者
///
/// 默认把 `text` 翻译成 `"[<target>] text"`，可以配置固定映射、延迟和失败。
pub struct MockProvider {
    calls: Mutex<Vec<ProviderCall>>,
    mapping: HashMap<String, String>,
    delay: Option<Duration>,
    failing: AtomicBool,
    fail_on_calls: Vec<usize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            mapping: HashMap::new(),
            delay: None,
            failing: AtomicBool::new(false),
            fail_on_calls: Vec::new(),
        }
    }

    /// 固定映射：源文本 -> 译文
    pub fn with_mapping(mut self, source: &str, translated: &str) -> Self {
        self.mapping.insert(source.to_string(), translated.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 每次调用都失败
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// 第 n 次调用失败（从 1 开始）
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_calls.push(n);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// 每次调用的文本数量
    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls().iter().map(|call| call.texts.len()).collect()
    }

    fn translate_one(&self, text: &str, target_language: &str) -> String {
        self.mapping
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", target_language, text))
    }
}

#[async_trait]
impl MachineTranslationProvider for MockProvider {
    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> TranslationResult<Vec<String>> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(ProviderCall {
                texts: texts.to_vec(),
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
            });
            calls.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) || self.fail_on_calls.contains(&call_number) {
            return Err(TranslationError::ProviderError(format!(
                "模拟失败: 第 {} 次调用",
                call_number
            )));
        }

        Ok(texts
            .iter()
            .map(|text| self.translate_one(text, target_language))
            .collect())
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// 可注入故障的记录存储
pub struct FlakyStore {
    inner: InMemoryRecordStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new(records: Vec<TranslationRecord>) -> Self {
        Self {
            inner: InMemoryRecordStore::with_records(records),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 成功写入的调用次数
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryRecordStore {
        &self.inner
    }

    fn check_read(&self) -> TranslationResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TranslationError::StoreError("模拟读取失败".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> TranslationResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TranslationError::StoreError("模拟写入失败".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl TranslationRecordStore for FlakyStore {
    async fn get(
        &self,
        language: &str,
        key: &str,
    ) -> TranslationResult<Option<TranslationRecord>> {
        self.check_read()?;
        self.inner.get(language, key).await
    }

    async fn get_many(
        &self,
        language: &str,
        keys: &[String],
    ) -> TranslationResult<HashMap<String, TranslationRecord>> {
        self.check_read()?;
        self.inner.get_many(language, keys).await
    }

    async fn upsert(&self, record: TranslationRecord) -> TranslationResult<()> {
        self.check_write()?;
        self.inner.upsert(record).await
    }

    async fn upsert_many(&self, records: Vec<TranslationRecord>) -> TranslationResult<()> {
        self.check_write()?;
        self.inner.upsert_many(records).await
    }

    async fn search_values(
        &self,
        language: &str,
        needle: &str,
    ) -> TranslationResult<Vec<TranslationRecord>> {
        self.check_read()?;
        self.inner.search_values(language, needle).await
    }

    async fn find_by_key_prefix(
        &self,
        language: &str,
        prefix: &str,
    ) -> TranslationResult<Vec<TranslationRecord>> {
        self.check_read()?;
        self.inner.find_by_key_prefix(language, prefix).await
    }

    async fn delete_key(&self, key: &str) -> TranslationResult<usize> {
        self.check_write()?;
        self.inner.delete_key(key).await
    }

    fn store_name(&self) -> &str {
        "flaky"
    }
}

/// 测试用配置：无批次间隔，限速足够宽松
pub fn test_config() -> TranslationConfig {
    TranslationConfig {
        batch_delay_ms: 0,
        provider_timeout_ms: 1_000,
        max_requests_per_second: 10_000.0,
        rate_limit_burst: 1_000,
        ..TranslationConfig::default()
    }
}

/// 预置记录的内存存储
pub fn seeded_store(records: &[(&str, &str, &str)]) -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::with_records(
        records
            .iter()
            .map(|(language, key, value)| TranslationRecord::new(*language, *key, *value)),
    ))
}

/// 构建解析器
pub fn build_resolver(
    config: TranslationConfig,
    store: Arc<dyn TranslationRecordStore>,
    provider: Arc<MockProvider>,
) -> TranslationResolver {
    TranslationResolver::new(config, store, provider).expect("测试配置应当有效")
}

/// 生成 n 个商品名称批量项
pub fn product_items(n: usize) -> Vec<BatchItem> {
    (0..n)
        .map(|i| BatchItem::new(format!("product.{}.name", 1000 + i), format!("Ürün {}", i)))
        .collect()
}
