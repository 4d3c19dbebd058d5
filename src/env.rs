//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 仅在变量被显式设置时返回值
    fn get_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "CATALOG_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 源语言（内容编写语言）
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "CATALOG_SOURCE_LANG";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("tr".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Language the catalog content is authored in";

        fn parse(value: &str) -> EnvResult<String> {
            parse_language_code(value, Self::NAME)
        }
    }

    /// 翻译 API 地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "CATALOG_TRANSLATE_API_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("http://localhost:3000/api/translate".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Machine translation endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 翻译 API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "CATALOG_TRANSLATE_API_KEY";
        const DEFAULT: Option<String> = None; // 无默认值
        const DESCRIPTION: &'static str = "Bearer token sent to the translation endpoint";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 单次提供者调用超时
    pub struct ProviderTimeout;
    impl EnvVar<Duration> for ProviderTimeout {
        const NAME: &'static str = "CATALOG_PROVIDER_TIMEOUT_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(5000));
        const DESCRIPTION: &'static str = "Timeout for a single translation provider call in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_usize(value, Self::NAME, 1, 120_000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }

    /// 批量翻译分块大小
    pub struct ChunkSize;
    impl EnvVar<usize> for ChunkSize {
        const NAME: &'static str = "CATALOG_CHUNK_SIZE";
        const DEFAULT: Option<usize> = Some(50);
        const DESCRIPTION: &'static str = "Number of texts sent per provider call in batch mode";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1000)
        }
    }

    /// 分块之间的节流延迟
    pub struct BatchDelay;
    impl EnvVar<Duration> for BatchDelay {
        const NAME: &'static str = "CATALOG_BATCH_DELAY_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(100));
        const DESCRIPTION: &'static str = "Pause between batch chunks in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_usize(value, Self::NAME, 0, 60_000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }

    /// 每秒最大请求数
    pub struct MaxRequestsPerSecond;
    impl EnvVar<f64> for MaxRequestsPerSecond {
        const NAME: &'static str = "CATALOG_MAX_REQUESTS_PER_SECOND";
        const DEFAULT: Option<f64> = Some(5.0);
        const DESCRIPTION: &'static str = "Maximum requests per second to the translation provider";

        fn parse(value: &str) -> EnvResult<f64> {
            let rate: f64 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number".to_string(),
            })?;

            if rate <= 0.0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Rate must be greater than 0".to_string(),
                });
            }

            if rate > 1000.0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Rate too high (max 1000 requests/second)".to_string(),
                });
            }

            Ok(rate)
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;

    /// 缓存启用状态
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "CATALOG_CACHE_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Enable the in-memory translation cache";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "CATALOG_WEB_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Web server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "CATALOG_WEB_PORT";
        const DEFAULT: Option<u16> = Some(7090);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            value.trim().parse::<u16>().ok().filter(|port| *port > 0).ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })
        }
    }
}

/// MongoDB相关环境变量
pub mod mongodb {
    use super::*;

    /// MongoDB连接字符串
    pub struct ConnectionString;
    impl EnvVar<String> for ConnectionString {
        const NAME: &'static str = "MONGODB_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("mongodb://localhost:27017".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "MongoDB connection string";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "MongoDB URL must start with mongodb:// or mongodb+srv://"
                        .to_string(),
                })
            }
        }
    }

    /// 数据库名称
    pub struct DatabaseName;
    impl EnvVar<String> for DatabaseName {
        const NAME: &'static str = "MONGODB_DATABASE";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("catalog".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "MongoDB database name";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME, "Database name cannot be empty")
        }
    }

    /// 集合名称
    pub struct CollectionName;
    impl EnvVar<String> for CollectionName {
        const NAME: &'static str = "MONGODB_COLLECTION";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("translations".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "MongoDB collection holding translation records";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME, "Collection name cannot be empty")
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_language_code(value: &str, var_name: &str) -> EnvResult<String> {
    let lang = value.trim().to_lowercase();
    let valid = (2..=8).contains(&lang.len())
        && lang.chars().all(|c| c.is_ascii_lowercase() || c == '-');
    if valid {
        Ok(lang)
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid language code '{}'", value),
        })
    }
}

fn parse_non_empty(value: &str, var_name: &str, message: &str) -> EnvResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: message.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,

    // 翻译配置
    pub source_lang: String,
    pub api_url: String,
    pub api_key: Option<String>,
    pub provider_timeout: Duration,
    pub chunk_size: usize,
    pub batch_delay: Duration,
    pub max_requests_per_second: f64,

    // 缓存配置
    pub cache_enabled: bool,

    // Web配置
    pub web_bind_address: String,
    pub web_port: u16,

    // MongoDB配置
    pub mongodb_connection_string: String,
    pub mongodb_database_name: String,
    pub mongodb_collection_name: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,

            source_lang: translation::SourceLang::get()?,
            api_url: translation::ApiUrl::get()?,
            api_key: translation::ApiKey::get().ok(),
            provider_timeout: translation::ProviderTimeout::get()?,
            chunk_size: translation::ChunkSize::get()?,
            batch_delay: translation::BatchDelay::get()?,
            max_requests_per_second: translation::MaxRequestsPerSecond::get()?,

            cache_enabled: cache::Enabled::get()?,

            web_bind_address: web::BindAddress::get()?,
            web_port: web::Port::get()?,

            mongodb_connection_string: mongodb::ConnectionString::get()?,
            mongodb_database_name: mongodb::DatabaseName::get()?,
            mongodb_collection_name: mongodb::CollectionName::get()?,
        })
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Log Level: {}", self.log_level);
        println!("  Source Language: {}", self.source_lang);
        println!("  Translation API: {}", self.api_url);
        println!(
            "  API Key: {}",
            if self.api_key.is_some() { "[SET]" } else { "[NOT SET]" }
        );
        println!("  Provider Timeout: {:?}", self.provider_timeout);
        println!("  Chunk Size: {}", self.chunk_size);
        println!("  Batch Delay: {:?}", self.batch_delay);
        println!("  Rate Limit: {} req/s", self.max_requests_per_second);
        println!("  Cache: {}", if self.cache_enabled { "enabled" } else { "disabled" });
        println!("  Web Server: {}:{}", self.web_bind_address, self.web_port);
        println!(
            "  MongoDB: {} / {} / {}",
            mask_credentials(&self.mongodb_connection_string),
            self.mongodb_database_name,
            self.mongodb_collection_name
        );
    }
}

/// 隐藏连接字符串中的用户名密码
fn mask_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}***{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}
