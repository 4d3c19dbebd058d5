//! 存储模块
//!
//! 提供三级解析中的前两级：进程内缓存和持久化记录存储。

pub mod cache;
pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod record;

pub use cache::{CacheKey, CacheStats, TranslationCache};
pub use memory::InMemoryRecordStore;
#[cfg(feature = "mongo")]
pub use mongo::{MongoConfig, MongoRecordStore};
pub use record::{TranslationRecord, TranslationRecordStore};
