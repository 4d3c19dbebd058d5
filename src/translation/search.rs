//! 实体搜索索引
//!
//! 在目标语言的译文中搜索，再从翻译键反查出对应的商品或分类。
//! 键的标识符段在历史数据中可能是 UUID、SKU 或 slug，因此按以下层级依次尝试，
//! 返回第一个非空的结果集：
//!
//! 1. 标识符段为 UUID 的值匹配
//! 2. 其余标识符段（SKU、slug，包括含非 ASCII 字符的旧 slug）的值匹配
//! 3. 标识符段以查询串开头的前缀匹配（例如输入 SKU 前缀）

use std::sync::Arc;

use tracing::debug;

use crate::translation::error::TranslationResult;
use crate::translation::keys::{
    entity_prefix, parse_entity_key, EntityType, IdentifierKind, KEY_SEPARATOR,
};
use crate::translation::storage::{TranslationRecord, TranslationRecordStore};

/// 命中的实体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMatch {
    pub entity_type: EntityType,
    pub entity_id: String,
    /// 命中的字段
    pub field: String,
    /// 命中的译文
    pub matched_value: String,
    pub id_kind: IdentifierKind,
}

impl EntityMatch {
    fn from_record(record: TranslationRecord) -> Option<Self> {
        let key = parse_entity_key(&record.translation_key)?;
        if !key.entity_type.is_catalog_entity() {
            return None;
        }
        let id_kind = key.identifier_kind();
        Some(Self {
            entity_type: key.entity_type,
            entity_id: key.entity_id,
            field: key.field,
            matched_value: record.translation_value,
            id_kind,
        })
    }
}

/// 实体搜索索引
#[derive(Clone)]
pub struct EntitySearchIndex {
    store: Arc<dyn TranslationRecordStore>,
}

impl EntitySearchIndex {
    pub fn new(store: Arc<dyn TranslationRecordStore>) -> Self {
        Self { store }
    }

    /// 搜索所有目录实体
    pub async fn search(&self, query: &str, language: &str) -> TranslationResult<Vec<EntityMatch>> {
        self.search_filtered(query, language, None).await
    }

    /// 只搜索指定类型的实体
    pub async fn search_type(
        &self,
        query: &str,
        language: &str,
        entity_type: EntityType,
    ) -> TranslationResult<Vec<EntityMatch>> {
        self.search_filtered(query, language, Some(entity_type)).await
    }

    async fn search_filtered(
        &self,
        query: &str,
        language: &str,
        entity_type: Option<EntityType>,
    ) -> TranslationResult<Vec<EntityMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let language = language.trim().to_lowercase();

        let matches: Vec<EntityMatch> = self
            .store
            .search_values(&language, query)
            .await?
            .into_iter()
            .filter_map(EntityMatch::from_record)
            .filter(|m| entity_type.as_ref().map_or(true, |t| &m.entity_type == t))
            .collect();

        let (uuid_tier, rest): (Vec<_>, Vec<_>) = matches
            .into_iter()
            .partition(|m| m.id_kind == IdentifierKind::Uuid);
        if !uuid_tier.is_empty() {
            debug!("搜索 '{}' 命中 UUID 层: {} 条", query, uuid_tier.len());
            return Ok(finalize(uuid_tier));
        }

        // 旧数据中的 slug 可能含土耳其语字母，分类为 Other 的标识符同样属于这一层
        let slug_tier = rest;
        if !slug_tier.is_empty() {
            debug!("搜索 '{}' 命中 SKU/slug 层: {} 条", query, slug_tier.len());
            return Ok(finalize(slug_tier));
        }

        let prefix_tier = self.prefix_matches(query, &language, entity_type).await?;
        debug!("搜索 '{}' 前缀层: {} 条", query, prefix_tier.len());
        Ok(finalize(prefix_tier))
    }

    async fn prefix_matches(
        &self,
        query: &str,
        language: &str,
        entity_type: Option<EntityType>,
    ) -> TranslationResult<Vec<EntityMatch>> {
        // 标识符段本身不含分隔符和空白
        if query.contains(KEY_SEPARATOR) || query.contains(char::is_whitespace) {
            return Ok(Vec::new());
        }

        let types = match entity_type {
            Some(t) => vec![t],
            None => vec![EntityType::Product, EntityType::Category],
        };

        let mut matches = Vec::new();
        for entity_type in types {
            let prefix = format!("{}{}", entity_prefix(&entity_type), query);
            let records = self.store.find_by_key_prefix(language, &prefix).await?;
            matches.extend(records.into_iter().filter_map(EntityMatch::from_record));
        }
        Ok(matches)
    }
}

/// 按 `(类型, 标识符)` 去重并排序
fn finalize(mut matches: Vec<EntityMatch>) -> Vec<EntityMatch> {
    matches.sort_by(|a, b| {
        (&a.entity_type, &a.entity_id, &a.field).cmp(&(&b.entity_type, &b.entity_id, &b.field))
    });
    matches.dedup_by(|a, b| a.entity_type == b.entity_type && a.entity_id == b.entity_id);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::storage::InMemoryRecordStore;

    fn index(records: Vec<TranslationRecord>) -> EntitySearchIndex {
        EntitySearchIndex::new(Arc::new(InMemoryRecordStore::with_records(records)))
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let index = index(vec![TranslationRecord::new("en", "product.2210.name", "LED")]);
        assert!(index.search("   ", "en").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dedup_by_entity() {
        let index = index(vec![
            TranslationRecord::new("en", "product.2210.name", "LED Panel"),
            TranslationRecord::new("en", "product.2210.description", "Slim LED panel"),
        ]);

        let results = index.search("led", "en").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity_id, "2210");
        assert_eq!(results[0].field, "description");
    }

    #[test]
    fn test_free_form_records_are_not_entities() {
        let record = TranslationRecord::new("en", "header.catalog", "Catalog");
        assert!(EntityMatch::from_record(record).is_none());

        let record = TranslationRecord::new("en", "menu.main.title", "Main");
        assert!(EntityMatch::from_record(record).is_none());
    }
}
