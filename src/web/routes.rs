//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建路由结构
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        // 解析接口
        .route("/api/i18n/resolve", post(resolve_key))
        .route("/api/i18n/resolve-batch", post(resolve_batch))
        .route("/api/i18n/search", get(search_entities))
        .route("/api/i18n/stats", get(get_stats))
        // 管理接口
        .route("/api/i18n/cache/clear", post(clear_cache))
        .route("/api/i18n/source", put(save_source_text))
        .route("/api/i18n/keys/:key", delete(delete_key))
}
