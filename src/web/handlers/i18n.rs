//! 本地化解析 API 处理器
//!
//! 解析类接口永远返回文本（失败时为回退文本）；只有管理端写入会把存储错误
//! 作为 500 暴露给调用方。

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;

use crate::translation::{EntityType, TranslationError};
use crate::web::types::{
    AppState, CacheStatsView, ClearCacheResponse, HealthResponse, ResolveBatchRequest,
    ResolveBatchResponse, ResolveRequest, ResolveResponse, SaveSourceRequest, SearchHit,
    SearchParams, SearchResponse, StatsResponse,
};

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
}

/// 将翻译错误映射为 HTTP 错误
fn error_response(error: TranslationError) -> ApiError {
    let status = match error {
        TranslationError::InvalidInput(_) | TranslationError::InvalidKey(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({
            "success": false,
            "error": error.to_string(),
            "category": format!("{:?}", error.category()),
        })),
    )
}

/// 单键解析
pub async fn resolve_key(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    if request.key.trim().is_empty() {
        return Err(bad_request("key 不能为空"));
    }
    if request.target_language.trim().is_empty() {
        return Err(bad_request("targetLanguage 不能为空"));
    }

    let resolution = match request.source_language {
        Some(ref source) if !source.trim().is_empty() => {
            state
                .resolver
                .resolve_from(&request.key, &request.target_language, source)
                .await
        }
        _ => {
            state
                .resolver
                .resolve_detailed(&request.key, &request.target_language)
                .await
        }
    };

    Ok(Json(ResolveResponse {
        key: request.key,
        text: resolution.text,
        outcome: resolution.outcome,
    }))
}

/// 批量解析
pub async fn resolve_batch(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<ResolveBatchRequest>,
) -> Result<Json<ResolveBatchResponse>, ApiError> {
    if request.target_language.trim().is_empty() {
        return Err(bad_request("targetLanguage 不能为空"));
    }
    if request.items.iter().any(|item| item.key.trim().is_empty()) {
        return Err(bad_request("items 中存在空的 key"));
    }

    tracing::info!(
        "收到批量解析请求: {} 项 -> {}",
        request.items.len(),
        request.target_language
    );

    let report = state
        .resolver
        .resolve_batch_detailed(request.items, &request.target_language)
        .await;
    Ok(Json(report.into()))
}

/// 清空进程内缓存
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ClearCacheResponse> {
    let cleared = state.resolver.clear_cache();
    Json(ClearCacheResponse {
        success: true,
        cleared,
    })
}

/// 实体搜索
pub async fn search_entities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let language = params
        .lang
        .filter(|lang| !lang.trim().is_empty())
        .unwrap_or_else(|| state.resolver.source_language().to_string());

    let results = match params.entity_type.as_deref() {
        None | Some("") => state.search.search(&params.q, &language).await,
        Some(segment) => {
            let entity_type = EntityType::from_segment(segment);
            if !entity_type.is_catalog_entity() {
                return Err(bad_request("type 只能是 product 或 category"));
            }
            state
                .search
                .search_type(&params.q, &language, entity_type)
                .await
        }
    }
    .map_err(error_response)?;

    Ok(Json(SearchResponse {
        query: params.q,
        language,
        results: results.into_iter().map(SearchHit::from).collect(),
    }))
}

/// 管理端保存源语言文本
pub async fn save_source_text(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<SaveSourceRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .resolver
        .save_source_text(&request.key, &request.value, request.context)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "success": true,
        "key": request.key,
        "language": state.resolver.source_language(),
    })))
}

/// 管理端删除键
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state
        .resolver
        .delete_key(&key)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "success": true,
        "key": key,
        "deleted": deleted,
    })))
}

/// 运行统计
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        resolver: state.resolver.stats(),
        cache: CacheStatsView::from(state.resolver.cache_stats()),
        in_flight: state.resolver.in_flight(),
    })
}

/// 健康检查
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::translation::VERSION,
        source_language: state.resolver.source_language().to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::translation::{
        EntitySearchIndex, InMemoryRecordStore, MachineTranslationProvider, TranslationConfig,
        TranslationRecord, TranslationResolver, TranslationResult,
    };

    struct UppercaseProvider;

    #[async_trait]
    impl MachineTranslationProvider for UppercaseProvider {
        async fn translate(
            &self,
            texts: &[String],
            _source_language: &str,
            _target_language: &str,
        ) -> TranslationResult<Vec<String>> {
            Ok(texts.iter().map(|t| t.to_uppercase()).collect())
        }

        fn provider_name(&self) -> &str {
            "uppercase"
        }
    }

    fn state() -> Arc<AppState> {
        let store = Arc::new(InMemoryRecordStore::with_records(vec![
            TranslationRecord::new("tr", "greeting", "Merhaba"),
            TranslationRecord::new(
                "en",
                "product.550e8400-e29b-41d4-a716-446655440000.name",
                "LED Panel",
            ),
        ]));
        let config = TranslationConfig {
            batch_delay_ms: 0,
            ..TranslationConfig::default()
        };
        let resolver =
            TranslationResolver::new(config, store.clone(), Arc::new(UppercaseProvider)).unwrap();
        Arc::new(AppState::new(resolver, EntitySearchIndex::new(store)))
    }

    #[tokio::test]
    async fn test_resolve_handler() {
        let request = ResolveRequest {
            key: "greeting".to_string(),
            target_language: "en".to_string(),
            source_language: None,
        };
        let Json(response) = resolve_key(State(state()), ExtractJson(request))
            .await
            .unwrap();
        assert_eq!(response.text, "MERHABA");
    }

    #[tokio::test]
    async fn test_resolve_rejects_empty_key() {
        let request = ResolveRequest {
            key: " ".to_string(),
            target_language: "en".to_string(),
            source_language: None,
        };
        let (status, _) = resolve_key(State(state()), ExtractJson(request))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_handler_rejects_unknown_type() {
        let params = SearchParams {
            q: "LED".to_string(),
            lang: Some("en".to_string()),
            entity_type: Some("menu".to_string()),
        };
        let (status, _) = search_entities(State(state()), Query(params))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_handler_returns_hits() {
        let params = SearchParams {
            q: "LED".to_string(),
            lang: Some("en".to_string()),
            entity_type: None,
        };
        let Json(response) = search_entities(State(state()), Query(params))
            .await
            .unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(
            response.results[0].entity_id,
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(response.results[0].id_kind, "uuid");
    }
}
