//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 语言相关
    pub const DEFAULT_SOURCE_LANG: &str = "tr";

    // 批次处理相关
    pub const DEFAULT_CHUNK_SIZE: usize = 50;
    pub const BATCH_DELAY_MS: u64 = 100;

    // 提供者相关
    pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/translate";
    pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_REQUESTS_PER_SECOND: f64 = 5.0;
    pub const DEFAULT_RATE_LIMIT_BURST: usize = 5;

    // 自动写入记录的来源标签
    pub const DEFAULT_CONTEXT: &str = "dynamic_content";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "catalog-i18n.toml",
        ".catalog-i18n.toml",
        "catalog-i18n.json",
        "~/.config/catalog-i18n/config.toml",
        "/etc/catalog-i18n/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置，失败时退回默认值
pub fn load_translation_config() -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.into_config(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            TranslationConfig::default()
        }
    }
}
