//! 机器翻译提供者
//!
//! 外部、限速的翻译 API 契约：输入有序文本列表，输出等长且按下标一一对应的译文列表。
//! 契约本身不做分块或节流，这些职责在解析器中。

pub mod http;
pub mod limiter;

use async_trait::async_trait;

use crate::translation::error::TranslationResult;

pub use http::HttpTranslationProvider;
pub use limiter::RateLimiter;

/// 机器翻译提供者契约
#[async_trait]
pub trait MachineTranslationProvider: Send + Sync {
    /// 翻译一批文本
    ///
    /// 返回的列表与输入等长并保持下标对应；任何非成功响应或传输错误都作为
    /// 整次调用的单个 `ProviderError` 返回。
    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> TranslationResult<Vec<String>>;

    /// 提供者名称，用于日志
    fn provider_name(&self) -> &str;
}
