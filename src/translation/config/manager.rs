//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译解析配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub source_lang: String,
    pub api_url: String,
    pub api_key: Option<String>,

    // 提供者配置
    pub provider_timeout_ms: u64,
    pub max_requests_per_second: f64,
    pub rate_limit_burst: usize,

    // 批次配置
    pub chunk_size: usize,
    pub batch_delay_ms: u64,

    // 缓存配置
    pub cache_enabled: bool,

    // 自动写入记录的 context 标签
    pub default_context: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: None,

            provider_timeout_ms: constants::DEFAULT_PROVIDER_TIMEOUT.as_millis() as u64,
            max_requests_per_second: constants::DEFAULT_MAX_REQUESTS_PER_SECOND,
            rate_limit_burst: constants::DEFAULT_RATE_LIMIT_BURST,

            chunk_size: constants::DEFAULT_CHUNK_SIZE,
            batch_delay_ms: constants::BATCH_DELAY_MS,

            cache_enabled: true,

            default_context: constants::DEFAULT_CONTEXT.to_string(),
        }
    }
}

impl TranslationConfig {
    /// 创建带指定源语言的默认配置
    pub fn with_source_lang(source_lang: &str) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.source_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("源语言不能为空".to_string()));
        }

        if self.chunk_size == 0 {
            return Err(TranslationError::ConfigError("分块大小不能为0".to_string()));
        }

        if self.provider_timeout_ms == 0 {
            return Err(TranslationError::ConfigError("提供者超时不能为0".to_string()));
        }

        if self.max_requests_per_second <= 0.0 || !self.max_requests_per_second.is_finite() {
            return Err(TranslationError::ConfigError("请求速率必须大于0".to_string()));
        }

        if self.rate_limit_burst == 0 {
            return Err(TranslationError::ConfigError("令牌桶容量不能为0".to_string()));
        }

        url::Url::parse(&self.api_url).map_err(|e| {
            TranslationError::ConfigError(format!("翻译API地址无效 '{}': {}", self.api_url, e))
        })?;

        Ok(())
    }

    /// 应用环境变量覆盖（只处理显式设置的变量）
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{cache, translation, EnvVar};

        if let Some(result) = translation::SourceLang::get_set() {
            match result {
                Ok(lang) => self.source_lang = lang,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if let Some(result) = translation::ApiUrl::get_set() {
            match result {
                Ok(api_url) => {
                    self.api_url = api_url;
                    tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
                }
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if let Some(Ok(api_key)) = translation::ApiKey::get_set() {
            self.api_key = Some(api_key);
        }

        if let Some(result) = translation::ProviderTimeout::get_set() {
            match result {
                Ok(timeout) => self.provider_timeout_ms = timeout.as_millis() as u64,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if let Some(result) = translation::ChunkSize::get_set() {
            match result {
                Ok(size) => self.chunk_size = size,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if let Some(result) = translation::BatchDelay::get_set() {
            match result {
                Ok(delay) => self.batch_delay_ms = delay.as_millis() as u64,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if let Some(result) = translation::MaxRequestsPerSecond::get_set() {
            match result {
                Ok(rate) => self.max_requests_per_second = rate,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if let Some(result) = cache::Enabled::get_set() {
            match result {
                Ok(enabled) => self.cache_enabled = enabled,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }
    }

    /// 转换为Duration类型
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// 简化的配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建配置管理器（仍然应用环境变量覆盖）
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        let expanded_path = shellexpand::tilde(path);
        let mut config = Self::load_from_file(&expanded_path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 按搜索路径加载配置
    fn load_config() -> TranslationResult<TranslationConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".toml") {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
