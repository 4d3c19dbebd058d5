//! HTTP 翻译提供者
//!
//! 请求体总是以数组形式发送：
//!
//! ```json
//! { "text": ["Merhaba"], "sourceLanguage": "tr", "targetLanguage": "en" }
//! ```
//!
//! 响应中的 `translations` 可能是单个对象也可能是数组，两种形态都接受并统一成数组。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::MachineTranslationProvider;
use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译请求
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    text: &'a [String],
    source_language: &'a str,
    target_language: &'a str,
}

/// 翻译响应
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    translations: Option<TranslationsPayload>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranslationsPayload {
    Many(Vec<TranslatedText>),
    One(TranslatedText),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

impl TranslationsPayload {
    fn into_texts(self) -> Vec<String> {
        match self {
            TranslationsPayload::Many(items) => {
                items.into_iter().map(|item| item.translated_text).collect()
            }
            TranslationsPayload::One(item) => vec![item.translated_text],
        }
    }
}

/// 解析响应体并校验下标对应关系
fn parse_response(body: &str, expected: usize) -> TranslationResult<Vec<String>> {
    let response: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::ProviderError(format!("无法解析翻译响应: {}", e)))?;

    if !response.success {
        let reason = response.error.unwrap_or_else(|| "success=false".to_string());
        return Err(TranslationError::ProviderError(format!(
            "翻译服务返回失败: {}",
            reason
        )));
    }

    let texts = response
        .translations
        .map(TranslationsPayload::into_texts)
        .ok_or_else(|| TranslationError::ProviderError("响应缺少 translations 字段".to_string()))?;

    if texts.len() != expected {
        return Err(TranslationError::ProviderError(format!(
            "译文数量不匹配: 期望 {}，实际 {}",
            expected,
            texts.len()
        )));
    }

    Ok(texts)
}

/// 基于 HTTP 的翻译提供者
#[derive(Debug, Clone)]
pub struct HttpTranslationProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpTranslationProvider {
    /// 创建新的 HTTP 提供者
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> TranslationResult<Self> {
        let api_url = api_url.into();
        url::Url::parse(&api_url).map_err(|e| {
            TranslationError::ConfigError(format!("翻译API地址无效 '{}': {}", api_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// 根据翻译配置创建
    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.provider_timeout(),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl MachineTranslationProvider for HttpTranslationProvider {
    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> TranslationResult<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = TranslateRequest {
            text: texts,
            source_language,
            target_language,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TranslationError::ProviderError(format!(
                "翻译服务返回状态 {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let translated = parse_response(&body, texts.len())?;
        tracing::debug!(
            "翻译服务返回 {} 条译文 ({} -> {})",
            translated.len(),
            source_language,
            target_language
        );
        Ok(translated)
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
