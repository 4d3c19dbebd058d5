//! 翻译解析核心模块
//!
//! 解析器按三级顺序查找文本：进程内缓存、持久化存储、远程翻译提供者。
//! 远程翻译的结果会写回存储，同一 `(语言, 键)` 的远程调用不会重复发生。
//!
//! ## 模块划分
//!
//! - **解析器** (`resolver.rs`): 单键解析、并发去重、管理端写入
//! - **批量** (`batch.rs`): 批量解析、分块与节流
//! - **统计** (`stats.rs`): 线程安全的运行统计
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog_i18n::translation::{
//!     HttpTranslationProvider, InMemoryRecordStore, TranslationConfig, TranslationResolver,
//! };
//!
//! # async fn example() -> catalog_i18n::TranslationResult<()> {
//! let config = TranslationConfig::default();
//! let provider = HttpTranslationProvider::from_config(&config)?;
//! let resolver = TranslationResolver::builder(config)
//!     .store(Arc::new(InMemoryRecordStore::new()))
//!     .provider(Arc::new(provider))
//!     .build()?;
//!
//! let text = resolver.resolve("header.catalog", "en").await;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod resolver;
pub mod stats;

pub use batch::{BatchItem, BatchReport};
pub use resolver::{Resolution, ResolutionOutcome, ResolverBuilder, TranslationResolver};
pub use stats::{ResolverStats, ResolverStatsSnapshot};
