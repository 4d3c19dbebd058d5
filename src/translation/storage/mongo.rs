//! MongoDB 记录存储
//!
//! 集合上建立 `(language_code, translation_key)` 唯一复合索引，
//! 所有写入都是按自然键的 upsert，并发写入者只会覆盖，不会产生重复行。
//! 批量写入用一条 `update` 命令携带整块 upsert 语句，一块只需一次往返。

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::stream::TryStreamExt;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use super::record::{TranslationRecord, TranslationRecordStore};
use crate::env::{EnvError, EnvResult, EnvVar};
use crate::translation::error::{helpers, TranslationResult};

/// 唯一索引名称
const NATURAL_KEY_INDEX: &str = "language_code_translation_key_unique";

/// MongoDB 配置
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// MongoDB 连接字符串
    pub connection_string: String,
    /// 数据库名称
    pub database_name: String,
    /// 集合名称
    pub collection_name: String,
}

impl MongoConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::mongodb;

        Ok(Self {
            connection_string: mongodb::ConnectionString::get()?,
            database_name: mongodb::DatabaseName::get()?,
            collection_name: mongodb::CollectionName::get()?,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.connection_string.is_empty() {
            return Err(EnvError {
                variable: "MONGODB_URL".to_string(),
                message: "Connection string cannot be empty".to_string(),
            });
        }

        if self.database_name.is_empty() {
            return Err(EnvError {
                variable: "MONGODB_DATABASE".to_string(),
                message: "Database name cannot be empty".to_string(),
            });
        }

        if self.collection_name.is_empty() {
            return Err(EnvError {
                variable: "MONGODB_COLLECTION".to_string(),
                message: "Collection name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("从环境变量加载MongoDB配置失败: {}，使用默认值", e);
            Self {
                connection_string: "mongodb://localhost:27017".to_string(),
                database_name: "catalog".to_string(),
                collection_name: "translations".to_string(),
            }
        })
    }
}

/// MongoDB中存储的翻译文档
#[derive(Debug, Serialize, Deserialize, Clone)]
struct TranslationDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    language_code: String,
    translation_key: String,
    translation_value: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime>,
    #[serde(default)]
    updated_at: Option<DateTime>,
}

impl From<TranslationDocument> for TranslationRecord {
    fn from(document: TranslationDocument) -> Self {
        Self {
            language_code: document.language_code,
            translation_key: document.translation_key,
            translation_value: document.translation_value,
            context: document.context,
        }
    }
}

/// MongoDB 记录存储
#[derive(Clone)]
pub struct MongoRecordStore {
    database: Database,
    collection: Collection<TranslationDocument>,
}

fn natural_key_filter(record: &TranslationRecord) -> Document {
    doc! {
        "language_code": &record.language_code,
        "translation_key": &record.translation_key,
    }
}

fn upsert_update(record: &TranslationRecord, now: DateTime) -> Document {
    doc! {
        "$set": {
            "translation_value": &record.translation_value,
            "context": record.context.clone(),
            "updated_at": now,
        },
        "$setOnInsert": { "created_at": now },
    }
}

/// 构建一次写入整块记录的 `update` 命令
fn build_upsert_command(
    collection_name: &str,
    records: &[TranslationRecord],
    now: DateTime,
) -> Document {
    let updates: Vec<Document> = records
        .iter()
        .map(|record| {
            doc! {
                "q": natural_key_filter(record),
                "u": upsert_update(record, now),
                "upsert": true,
            }
        })
        .collect();

    doc! {
        "update": collection_name,
        "updates": updates,
        "ordered": true,
    }
}

/// `update` 命令在 `ok: 1` 时仍可能带有逐条的写入错误
fn check_write_errors(reply: &Document) -> TranslationResult<()> {
    let Ok(errors) = reply.get_array("writeErrors") else {
        return Ok(());
    };
    if errors.is_empty() {
        return Ok(());
    }

    let first = errors
        .first()
        .and_then(|error| error.as_document())
        .and_then(|error| error.get_str("errmsg").ok())
        .unwrap_or("unknown write error");
    Err(helpers::store_error(format!(
        "批量写入失败: {} 条错误，首个错误: {}",
        errors.len(),
        first
    )))
}

impl MongoRecordStore {
    /// 连接数据库并确保唯一索引存在
    pub async fn connect(config: &MongoConfig) -> TranslationResult<Self> {
        config
            .validate()
            .map_err(|e| crate::translation::error::helpers::config_error(e))?;

        let client = Client::with_uri_str(&config.connection_string).await?;
        let database = client.database(&config.database_name);
        let collection = database.collection::<TranslationDocument>(&config.collection_name);

        let store = Self {
            database,
            collection,
        };
        store.ensure_indexes().await?;

        tracing::info!(
            "MongoDB翻译存储已连接: {}/{}",
            config.database_name,
            config.collection_name
        );
        Ok(store)
    }

    /// 自然键上的唯一索引是并发写入的唯一一致性边界
    async fn ensure_indexes(&self) -> TranslationResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name(NATURAL_KEY_INDEX.to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "language_code": 1, "translation_key": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;
        Ok(())
    }

    async fn upsert_record(&self, record: &TranslationRecord) -> TranslationResult<()> {
        self.collection
            .update_one(
                natural_key_filter(record),
                upsert_update(record, DateTime::now()),
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find_records(&self, filter: bson::Document) -> TranslationResult<Vec<TranslationRecord>> {
        let cursor = self.collection.find(filter).await?;
        let documents: Vec<TranslationDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(TranslationRecord::from).collect())
    }
}

#[async_trait]
impl TranslationRecordStore for MongoRecordStore {
    async fn get(
        &self,
        language: &str,
        key: &str,
    ) -> TranslationResult<Option<TranslationRecord>> {
        let document = self
            .collection
            .find_one(doc! { "language_code": language, "translation_key": key })
            .await?;
        Ok(document.map(TranslationRecord::from))
    }

    async fn get_many(
        &self,
        language: &str,
        keys: &[String],
    ) -> TranslationResult<HashMap<String, TranslationRecord>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let records = self
            .find_records(doc! {
                "language_code": language,
                "translation_key": { "$in": keys.to_vec() },
            })
            .await?;

        Ok(records
            .into_iter()
            .map(|record| (record.translation_key.clone(), record))
            .collect())
    }

    async fn upsert(&self, record: TranslationRecord) -> TranslationResult<()> {
        self.upsert_record(&record).await
    }

    async fn upsert_many(&self, records: Vec<TranslationRecord>) -> TranslationResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let command = build_upsert_command(self.collection.name(), &records, DateTime::now());
        let reply = self.database.run_command(command).await?;
        check_write_errors(&reply)?;

        tracing::debug!("MongoDB批量写入 {} 条翻译记录", records.len());
        Ok(())
    }

    async fn search_values(
        &self,
        language: &str,
        needle: &str,
    ) -> TranslationResult<Vec<TranslationRecord>> {
        self.find_records(doc! {
            "language_code": language,
            "translation_key": { "$regex": r"^(product|category)\.[^.]+\..+" },
            "translation_value": { "$regex": regex::escape(needle), "$options": "i" },
        })
        .await
    }

    async fn find_by_key_prefix(
        &self,
        language: &str,
        prefix: &str,
    ) -> TranslationResult<Vec<TranslationRecord>> {
        self.find_records(doc! {
            "language_code": language,
            "translation_key": { "$regex": format!("^{}", regex::escape(prefix)) },
        })
        .await
    }

    async fn delete_key(&self, key: &str) -> TranslationResult<usize> {
        let result = self
            .collection
            .delete_many(doc! { "translation_key": key })
            .await?;
        Ok(result.deleted_count as usize)
    }

    fn store_name(&self) -> &str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_command_carries_whole_chunk() {
        let records = vec![
            TranslationRecord::new("en", "product.2210.name", "LED Spot").with_context("product"),
            TranslationRecord::new("en", "header.catalog", "Catalog"),
        ];
        let command = build_upsert_command("translations", &records, DateTime::now());

        assert_eq!(command.get_str("update").unwrap(), "translations");
        assert!(command.get_bool("ordered").unwrap());

        let updates = command.get_array("updates").unwrap();
        assert_eq!(updates.len(), 2);

        let first = updates[0].as_document().unwrap();
        assert!(first.get_bool("upsert").unwrap());
        let filter = first.get_document("q").unwrap();
        assert_eq!(filter.get_str("language_code").unwrap(), "en");
        assert_eq!(filter.get_str("translation_key").unwrap(), "product.2210.name");
        let set = first.get_document("u").unwrap().get_document("$set").unwrap();
        assert_eq!(set.get_str("translation_value").unwrap(), "LED Spot");
        assert_eq!(set.get_str("context").unwrap(), "product");
    }

    #[test]
    fn test_write_errors_are_reported() {
        assert!(check_write_errors(&doc! { "ok": 1, "n": 2 }).is_ok());
        assert!(check_write_errors(&doc! { "ok": 1, "writeErrors": [] }).is_ok());

        let reply = doc! {
            "ok": 1,
            "n": 1,
            "writeErrors": [ { "index": 1, "code": 11000, "errmsg": "E11000 duplicate key" } ],
        };
        let error = check_write_errors(&reply).unwrap_err();
        assert!(error.to_string().contains("E11000"));
    }
}
