//! 翻译模块
//!
//! 本地化解析与自动翻译管道，采用清晰的模块化架构：
//! - **core**: 解析器（单键、批量、并发去重）与统计
//! - **storage**: 进程内缓存和记录存储
//! - **provider**: 机器翻译提供者契约、HTTP 实现和限速器
//! - **search**: 基于译文的实体反查
//! - **keys**: 翻译键约定
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog_i18n::translation::{
//!     BatchItem, HttpTranslationProvider, InMemoryRecordStore, TranslationConfig,
//!     TranslationResolver,
//! };
//!
//! # async fn example() -> catalog_i18n::TranslationResult<()> {
//! let config = TranslationConfig::default();
//! let provider = HttpTranslationProvider::from_config(&config)?;
//! let resolver = TranslationResolver::new(
//!     config,
//!     Arc::new(InMemoryRecordStore::new()),
//!     Arc::new(provider),
//! )?;
//!
//! let items = vec![BatchItem::new("product.2210.name", "LED Panel")];
//! let translations = resolver.resolve_batch(items, "en").await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 源语言、提供者地址、分块与限速参数
pub mod config;

/// 解析器核心模块
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 翻译键约定 - 实体键的构建与解析
pub mod keys;

/// 机器翻译提供者
pub mod provider;

/// 实体搜索索引
pub mod search;

/// 存储管理模块 - 缓存和持久化记录
pub mod storage;

// ============================================================================
// 核心API导出
// ============================================================================

pub use self::core::{
    BatchItem, BatchReport, Resolution, ResolutionOutcome, ResolverBuilder, ResolverStats,
    ResolverStatsSnapshot, TranslationResolver,
};

pub use config::{constants, ConfigManager, TranslationConfig};

pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};

pub use keys::{
    build_entity_key, parse_entity_key, EntityKey, EntityType, IdentifierKind,
};

pub use provider::{HttpTranslationProvider, MachineTranslationProvider, RateLimiter};

pub use search::{EntityMatch, EntitySearchIndex};

pub use storage::{
    CacheStats, InMemoryRecordStore, TranslationCache, TranslationRecord, TranslationRecordStore,
};

#[cfg(feature = "mongo")]
pub use storage::{MongoConfig, MongoRecordStore};

// ============================================================================
// 便利函数
// ============================================================================

/// 检查翻译配置文件是否存在
pub fn config_file_exists() -> bool {
    config::config_file_exists()
}

/// 加载翻译配置，找不到或无效时使用默认值
pub fn load_translation_config() -> TranslationConfig {
    config::load_translation_config()
}

/// 在指定路径生成示例配置文件
pub fn generate_example_config(path: &str) -> TranslationResult<()> {
    ConfigManager::generate_example_config(path)?;
    tracing::info!("已生成示例配置文件: {}", path);
    Ok(())
}

// ============================================================================
// 模块信息
// ============================================================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MODULE_NAME: &str = "translation";

/// 模块信息
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub name: String,
    pub version: String,
    pub features: Vec<String>,
}

/// 获取模块信息
pub fn get_module_info() -> ModuleInfo {
    ModuleInfo {
        name: MODULE_NAME.to_string(),
        version: VERSION.to_string(),
        features: get_enabled_features(),
    }
}

/// 获取启用的功能
fn get_enabled_features() -> Vec<String> {
    let mut features = vec![
        "resolver".to_string(),
        "memory_store".to_string(),
        "http_provider".to_string(),
        "entity_search".to_string(),
    ];

    #[cfg(feature = "mongo")]
    features.push("mongodb_storage".to_string());

    #[cfg(feature = "web")]
    features.push("web_api".to_string());

    features
}

/// 模块初始化日志
pub fn init() {
    tracing::info!("翻译模块 v{} 已加载", VERSION);
    tracing::info!("启用的功能: {:?}", get_enabled_features());
}
