//! 内存记录存储
//!
//! 以自然键 `(language_code, translation_key)` 为映射键，重复行在结构上不可能出现。
//! 用于开发环境和测试。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::record::{TranslationRecord, TranslationRecordStore};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::keys::parse_entity_key;

type NaturalKey = (String, String);

/// 内存记录存储
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<NaturalKey, TranslationRecord>>,
    write_batches: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用给定记录初始化
    pub fn with_records(records: impl IntoIterator<Item = TranslationRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.records.write() {
            for record in records {
                map.insert(natural_key(&record), record);
            }
        }
        store
    }

    /// 记录总数
    pub fn len(&self) -> usize {
        self.records.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已执行的写入调用次数（`upsert` 与 `upsert_many` 各计一次）
    pub fn write_batches(&self) -> usize {
        self.write_batches.load(Ordering::Relaxed)
    }

    /// 所有记录的快照
    pub fn snapshot(&self) -> Vec<TranslationRecord> {
        self.records
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    fn read(
        &self,
    ) -> TranslationResult<std::sync::RwLockReadGuard<'_, HashMap<NaturalKey, TranslationRecord>>>
    {
        self.records
            .read()
            .map_err(|e| TranslationError::StoreError(format!("内存存储锁已损坏: {}", e)))
    }

    fn write(
        &self,
    ) -> TranslationResult<std::sync::RwLockWriteGuard<'_, HashMap<NaturalKey, TranslationRecord>>>
    {
        self.records
            .write()
            .map_err(|e| TranslationError::StoreError(format!("内存存储锁已损坏: {}", e)))
    }
}

fn natural_key(record: &TranslationRecord) -> NaturalKey {
    (record.language_code.clone(), record.translation_key.clone())
}

#[async_trait]
impl TranslationRecordStore for InMemoryRecordStore {
    async fn get(
        &self,
        language: &str,
        key: &str,
    ) -> TranslationResult<Option<TranslationRecord>> {
        let map = self.read()?;
        Ok(map.get(&(language.to_string(), key.to_string())).cloned())
    }

    async fn get_many(
        &self,
        language: &str,
        keys: &[String],
    ) -> TranslationResult<HashMap<String, TranslationRecord>> {
        let map = self.read()?;
        let found = keys
            .iter()
            .filter_map(|key| {
                map.get(&(language.to_string(), key.clone()))
                    .map(|record| (key.clone(), record.clone()))
            })
            .collect();
        Ok(found)
    }

    async fn upsert(&self, record: TranslationRecord) -> TranslationResult<()> {
        let mut map = self.write()?;
        map.insert(natural_key(&record), record);
        self.write_batches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn upsert_many(&self, records: Vec<TranslationRecord>) -> TranslationResult<()> {
        let mut map = self.write()?;
        for record in records {
            map.insert(natural_key(&record), record);
        }
        self.write_batches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn search_values(
        &self,
        language: &str,
        needle: &str,
    ) -> TranslationResult<Vec<TranslationRecord>> {
        let needle = needle.to_lowercase();
        let map = self.read()?;
        let matches = map
            .values()
            .filter(|record| record.language_code == language)
            .filter(|record| {
                parse_entity_key(&record.translation_key)
                    .map_or(false, |key| key.entity_type.is_catalog_entity())
            })
            .filter(|record| record.translation_value.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn find_by_key_prefix(
        &self,
        language: &str,
        prefix: &str,
    ) -> TranslationResult<Vec<TranslationRecord>> {
        let map = self.read()?;
        let matches = map
            .values()
            .filter(|record| {
                record.language_code == language && record.translation_key.starts_with(prefix)
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn delete_key(&self, key: &str) -> TranslationResult<usize> {
        let mut map = self.write()?;
        let before = map.len();
        map.retain(|(_, record_key), _| record_key != key);
        Ok(before - map.len())
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}
