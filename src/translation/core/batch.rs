//! 批量解析
//!
//! 先用一次 `get_many` 过滤掉存储中已有的键，剩余部分按固定大小分块，
//! 逐块顺序调用提供者，块与块之间固定间隔。每个成功的块用一次
//! `upsert_many` 写回；失败的块回退到源文本并继续下一块。

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::resolver::{normalize_language, TranslationResolver};
use crate::translation::error::{helpers, TranslationResult};
use crate::translation::keys::{build_entity_key, parse_entity_key, EntityType};
use crate::translation::storage::TranslationRecord;

/// 批量解析的输入项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub key: String,
    /// 调用方提供的源语言文本
    pub source_text: String,
    /// 写回记录时使用的来源标签
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl BatchItem {
    pub fn new(key: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source_text: source_text.into(),
            context: None,
        }
    }

    /// 为实体字段创建输入项
    pub fn entity(
        entity_type: EntityType,
        entity_id: &str,
        field: &str,
        source_text: impl Into<String>,
    ) -> TranslationResult<Self> {
        let key = build_entity_key(entity_type, entity_id, field)?;
        Ok(Self::new(key, source_text))
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// 批量解析报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// 每个输入键都会出现在这里
    pub translations: HashMap<String, String>,
    pub stored_hits: usize,
    pub translated: usize,
    pub fallbacks: usize,
    pub provider_calls: usize,
    pub failed_chunks: usize,
    /// 输入中被忽略的重复键数量
    pub duplicates: usize,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

impl TranslationResolver {
    /// 批量解析，返回 键 -> 文本
    pub async fn resolve_batch(
        &self,
        items: Vec<BatchItem>,
        target_language: &str,
    ) -> HashMap<String, String> {
        self.resolve_batch_detailed(items, target_language)
            .await
            .translations
    }

    /// 批量解析并返回详细报告
    pub async fn resolve_batch_detailed(
        &self,
        items: Vec<BatchItem>,
        target_language: &str,
    ) -> BatchReport {
        let inner = &self.inner;
        inner.stats.inc_batch_requests();

        let target = normalize_language(target_language);
        let source = normalize_language(&inner.config.source_lang);
        let mut report = BatchReport::default();

        // 同一个键只保留第一次出现
        let mut seen = HashSet::with_capacity(items.len());
        let mut unique = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(item.key.clone()) {
                unique.push(item);
            } else {
                report.duplicates += 1;
            }
        }

        if target == source {
            report.translations = unique
                .into_iter()
                .map(|item| (item.key, item.source_text))
                .collect();
            return report;
        }

        let keys: Vec<String> = unique.iter().map(|item| item.key.clone()).collect();
        let stored = match inner.store.get_many(&target, &keys).await {
            Ok(found) => found,
            Err(e) => {
                inner.stats.inc_store_errors();
                helpers::log_error(&e.with_context("批量读取"));
                HashMap::new()
            }
        };

        let mut needs_translation = Vec::new();
        for item in unique {
            match stored.get(&item.key) {
                Some(record) => {
                    if inner.config.cache_enabled {
                        inner
                            .cache
                            .put(&target, &item.key, &record.translation_value);
                    }
                    report
                        .translations
                        .insert(item.key, record.translation_value.clone());
                    report.stored_hits += 1;
                }
                None => needs_translation.push(item),
            }
        }

        if needs_translation.is_empty() {
            debug!("批量解析全部命中存储: {} 个键", report.stored_hits);
            return report;
        }

        let chunk_size = inner.config.chunk_size.max(1);
        let total_chunks = needs_translation.len().div_ceil(chunk_size);
        info!(
            "批量翻译 {} -> {}: {} 个键需要翻译，分为 {} 块",
            source,
            target,
            needs_translation.len(),
            total_chunks
        );

        for (index, chunk) in needs_translation.chunks(chunk_size).enumerate() {
            if index > 0 {
                sleep(inner.config.batch_delay()).await;
            }

            let texts: Vec<String> = chunk.iter().map(|item| item.source_text.clone()).collect();
            report.provider_calls += 1;

            let translated = match inner
                .call_provider(&texts, &source, &target)
                .await
            {
                Ok(translated) => translated,
                Err(e) => {
                    helpers::log_error(&e);
                    warn!(
                        "第 {}/{} 块翻译失败，{} 个键使用源文本",
                        index + 1,
                        total_chunks,
                        chunk.len()
                    );
                    report.failed_chunks += 1;
                    report.fallbacks += chunk.len();
                    inner.stats.add_fallbacks(chunk.len());
                    for item in chunk {
                        report
                            .translations
                            .insert(item.key.clone(), item.source_text.clone());
                    }
                    continue;
                }
            };

            let mut records = Vec::with_capacity(chunk.len());
            for (item, text) in chunk.iter().zip(translated) {
                if text.trim().is_empty() {
                    report.fallbacks += 1;
                    inner.stats.add_fallbacks(1);
                    report
                        .translations
                        .insert(item.key.clone(), item.source_text.clone());
                    continue;
                }

                records.push(
                    TranslationRecord::new(&target, &item.key, &text)
                        .with_context(self.context_for(item)),
                );
                report.translations.insert(item.key.clone(), text);
                report.translated += 1;
            }

            if records.is_empty() {
                continue;
            }

            let written = records.len();
            let cache_entries: Vec<(String, String)> = if inner.config.cache_enabled {
                records
                    .iter()
                    .map(|r| (r.translation_key.clone(), r.translation_value.clone()))
                    .collect()
            } else {
                Vec::new()
            };

            match inner.store.upsert_many(records).await {
                Ok(()) => {
                    inner.stats.add_records_written(written);
                    inner.cache.put_many(&target, cache_entries);
                    debug!("第 {}/{} 块已写回 {} 条记录", index + 1, total_chunks, written);
                }
                Err(e) => {
                    inner.stats.inc_store_errors();
                    helpers::log_error(&e);
                }
            }
        }

        info!(
            "批量翻译完成: 存储命中 {}，翻译 {}，回退 {}，提供者调用 {}",
            report.stored_hits, report.translated, report.fallbacks, report.provider_calls
        );
        report
    }

    /// 自动写回记录的来源标签
    fn context_for(&self, item: &BatchItem) -> String {
        if let Some(ref context) = item.context {
            return context.clone();
        }
        match parse_entity_key(&item.key) {
            Some(key) if key.entity_type.is_catalog_entity() => key.entity_type.to_string(),
            _ => self.inner.config.default_context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_item_builds_key() {
        let item = BatchItem::entity(EntityType::Product, "2210", "name", "LED Panel").unwrap();
        assert_eq!(item.key, "product.2210.name");
        assert_eq!(item.source_text, "LED Panel");
        assert!(item.context.is_none());
    }

    #[test]
    fn test_item_deserializes_camel_case() {
        let item: BatchItem =
            serde_json::from_str(r#"{"key":"header.catalog","sourceText":"Katalog"}"#).unwrap();
        assert_eq!(item, BatchItem::new("header.catalog", "Katalog"));
    }
}
