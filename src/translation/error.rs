//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。解析路径上的错误只用于日志和统计，
//! 调用方拿到的永远是可显示的回退文本；只有管理端写入会把存储错误向上传播。

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 源语言中不存在该键，无可翻译内容
    #[error("源语言 {language} 中缺少键: {key}")]
    MissingSourceText { language: String, key: String },

    /// 翻译提供者返回失败或传输错误
    #[error("翻译提供者错误: {0}")]
    ProviderError(String),

    /// 翻译提供者超时
    #[error("翻译提供者超时: {0:?}")]
    ProviderTimeout(Duration),

    /// 存储连接或驱动错误
    #[error("存储错误: {0}")]
    StoreError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 翻译键格式错误
    #[error("翻译键格式无效: {0}")]
    InvalidKey(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::MissingSourceText { .. } => false, // 需要编辑人员补充源文本
            TranslationError::ProviderError(_) => true,
            TranslationError::ProviderTimeout(_) => true,
            TranslationError::StoreError(_) => true,
            TranslationError::ConfigError(_) => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::InvalidKey(_) => false,
            TranslationError::SerializationError(_) => false,
            TranslationError::InternalError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::MissingSourceText { .. } => ErrorSeverity::Info,
            TranslationError::ProviderError(_) => ErrorSeverity::Warning,
            TranslationError::ProviderTimeout(_) => ErrorSeverity::Warning,
            TranslationError::StoreError(_) => ErrorSeverity::Error,
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::InvalidKey(_) => ErrorSeverity::Info,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::MissingSourceText { .. } => ErrorCategory::Content,
            TranslationError::ProviderError(_) => ErrorCategory::Provider,
            TranslationError::ProviderTimeout(_) => ErrorCategory::Timeout,
            TranslationError::StoreError(_) => ErrorCategory::Store,
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::InvalidKey(_) => ErrorCategory::Input,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 是否属于提供者失败（超时与失败同等处理）
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            TranslationError::ProviderError(_) | TranslationError::ProviderTimeout(_)
        )
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        match &mut self {
            TranslationError::ProviderError(msg)
            | TranslationError::StoreError(msg)
            | TranslationError::ConfigError(msg)
            | TranslationError::InvalidInput(msg)
            | TranslationError::InvalidKey(msg)
            | TranslationError::SerializationError(msg)
            | TranslationError::InternalError(msg) => {
                *msg = format!("{} (上下文: {})", msg, context);
            }
            TranslationError::MissingSourceText { .. } | TranslationError::ProviderTimeout(_) => {}
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Content,
    Provider,
    Timeout,
    Store,
    Configuration,
    Input,
    Serialization,
    Internal,
}

/// 标准错误转换
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::InternalError(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        TranslationError::ProviderError(format!("HTTP请求失败: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::InternalError(format!("异步操作超时: {}", error))
    }
}

#[cfg(feature = "mongo")]
impl From<mongodb::error::Error> for TranslationError {
    fn from(error: mongodb::error::Error) -> Self {
        TranslationError::StoreError(format!("MongoDB错误: {}", error))
    }
}

#[cfg(feature = "mongo")]
impl From<bson::de::Error> for TranslationError {
    fn from(error: bson::de::Error) -> Self {
        TranslationError::SerializationError(format!("BSON反序列化错误: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误，不改变错误本身
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::debug!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }

    /// 创建存储错误
    pub fn store_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::StoreError(msg.to_string())
    }

    /// 创建提供者错误
    pub fn provider_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ProviderError(msg.to_string())
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InvalidInput(msg.to_string())
    }
}
