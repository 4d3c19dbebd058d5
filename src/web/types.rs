//! Web 模块的数据类型定义

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::translation::{
    BatchItem, BatchReport, CacheStats, EntityMatch, EntitySearchIndex, IdentifierKind,
    ResolutionOutcome, ResolverStatsSnapshot, TranslationResolver,
};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub resolver: TranslationResolver,
    pub search: EntitySearchIndex,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(resolver: TranslationResolver, search: EntitySearchIndex) -> Self {
        Self {
            resolver,
            search,
            started_at: Instant::now(),
        }
    }
}

/// 单键解析请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub key: String,
    pub target_language: String,
    #[serde(default)]
    pub source_language: Option<String>,
}

/// 单键解析响应
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub key: String,
    pub text: String,
    pub outcome: ResolutionOutcome,
}

/// 批量解析请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBatchRequest {
    pub items: Vec<BatchItem>,
    pub target_language: String,
}

/// 批量解析摘要
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub stored_hits: usize,
    pub translated: usize,
    pub fallbacks: usize,
    pub provider_calls: usize,
    pub failed_chunks: usize,
    pub duplicates: usize,
}

/// 批量解析响应
#[derive(Debug, Serialize)]
pub struct ResolveBatchResponse {
    pub translations: HashMap<String, String>,
    pub report: BatchSummary,
}

impl From<BatchReport> for ResolveBatchResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            report: BatchSummary {
                stored_hits: report.stored_hits,
                translated: report.translated,
                fallbacks: report.fallbacks,
                provider_calls: report.provider_calls,
                failed_chunks: report.failed_chunks,
                duplicates: report.duplicates,
            },
            translations: report.translations,
        }
    }
}

/// 清空缓存响应
#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub success: bool,
    pub cleared: usize,
}

/// 搜索参数
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
}

/// 搜索命中
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub entity_type: String,
    pub entity_id: String,
    pub field: String,
    pub matched_value: String,
    pub id_kind: &'static str,
}

impl From<EntityMatch> for SearchHit {
    fn from(entity: EntityMatch) -> Self {
        Self {
            entity_type: entity.entity_type.to_string(),
            entity_id: entity.entity_id,
            field: entity.field,
            matched_value: entity.matched_value,
            id_kind: match entity.id_kind {
                IdentifierKind::Uuid => "uuid",
                IdentifierKind::Slug => "slug",
                IdentifierKind::Other => "other",
            },
        }
    }
}

/// 搜索响应
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub language: String,
    pub results: Vec<SearchHit>,
}

/// 保存源文本请求
#[derive(Debug, Deserialize)]
pub struct SaveSourceRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// 缓存统计
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsView {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub clears: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsView {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            entries: stats.total_entries,
            hits: stats.cache_hits,
            misses: stats.cache_misses,
            clears: stats.clears,
        }
    }
}

/// 统计响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub resolver: ResolverStatsSnapshot,
    pub cache: CacheStatsView,
    pub in_flight: usize,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub source_language: String,
    pub uptime_seconds: u64,
}
