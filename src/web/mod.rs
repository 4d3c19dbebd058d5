//! Web 服务器模块
//!
//! 通过 HTTP 暴露解析器的调用方接口和管理端操作

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::translation::{
    EntitySearchIndex, HttpTranslationProvider, InMemoryRecordStore, MongoRecordStore,
    TranslationConfig, TranslationRecordStore, TranslationResolver, TranslationResult,
};

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    translation_config: TranslationConfig,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig, translation_config: TranslationConfig) -> Self {
        Self {
            config,
            translation_config,
        }
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> TranslationResult<()> {
        self.config
            .validate()
            .map_err(crate::translation::error::helpers::config_error)?;

        let store: Arc<dyn TranslationRecordStore> = match self.config.mongo_config {
            Some(ref mongo_config) => Arc::new(MongoRecordStore::connect(mongo_config).await?),
            None => {
                tracing::warn!("未配置 MongoDB，使用内存存储（重启后数据丢失）");
                Arc::new(InMemoryRecordStore::new())
            }
        };

        let provider = HttpTranslationProvider::from_config(&self.translation_config)?;
        tracing::info!("翻译提供者: {}", provider.api_url());

        let resolver = TranslationResolver::new(
            self.translation_config.clone(),
            Arc::clone(&store),
            Arc::new(provider),
        )?;
        let search = EntitySearchIndex::new(store);

        let app = create_router(Arc::new(AppState::new(resolver, search)));

        let address = self.config.listen_address();
        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!("Web 服务器启动: http://{}", address);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}
