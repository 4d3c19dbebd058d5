//! # Catalog I18n Library
//!
//! 目录商城的本地化解析与自动翻译管道：按任意语言提供界面文本，
//! 缺失时按需调用机器翻译，并把结果持久化，保证同一远程调用不会重复发生。
//!
//! ## 模块组织
//!
//! - `env` - 类型安全的环境变量管理
//! - `translation` - 解析器、缓存、存储契约、翻译提供者与实体搜索
//! - `web` - HTTP 接口（可选）

pub mod env;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use translation::{
    BatchItem, EntitySearchIndex, TranslationConfig, TranslationError, TranslationResolver,
    TranslationResult,
};
