//! 翻译记录与记录存储契约
//!
//! 存储只提供键值形式的读写，不包含业务逻辑。`(language_code, translation_key)`
//! 是自然键，所有写入都必须是按自然键冲突合并的 upsert，绝不能是普通插入。

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::error::TranslationResult;

/// 翻译记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub language_code: String,
    pub translation_key: String,
    pub translation_value: String,
    /// 来源标签（仅供参考，不参与查找）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl TranslationRecord {
    pub fn new(
        language_code: impl Into<String>,
        translation_key: impl Into<String>,
        translation_value: impl Into<String>,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            translation_key: translation_key.into(),
            translation_value: translation_value.into(),
            context: None,
        }
    }

    /// 设置来源标签
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// 翻译记录存储契约
#[async_trait]
pub trait TranslationRecordStore: Send + Sync {
    /// 读取单条记录
    async fn get(&self, language: &str, key: &str)
        -> TranslationResult<Option<TranslationRecord>>;

    /// 批量读取，只返回找到的子集；调用方不能假设顺序或完整性
    async fn get_many(
        &self,
        language: &str,
        keys: &[String],
    ) -> TranslationResult<HashMap<String, TranslationRecord>>;

    /// 按自然键写入或覆盖
    async fn upsert(&self, record: TranslationRecord) -> TranslationResult<()>;

    /// 批量按自然键写入或覆盖
    async fn upsert_many(&self, records: Vec<TranslationRecord>) -> TranslationResult<()>;

    /// 在某语言的实体记录中按值做不区分大小写的子串搜索
    async fn search_values(
        &self,
        language: &str,
        needle: &str,
    ) -> TranslationResult<Vec<TranslationRecord>>;

    /// 按键前缀列出某语言的记录
    async fn find_by_key_prefix(
        &self,
        language: &str,
        prefix: &str,
    ) -> TranslationResult<Vec<TranslationRecord>>;

    /// 删除某个键在所有语言下的记录，返回删除数量
    async fn delete_key(&self, key: &str) -> TranslationResult<usize>;

    /// 存储名称，用于日志
    fn store_name(&self) -> &str;
}
