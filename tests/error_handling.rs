//! 错误处理集成测试
//!
//! 测试提供者失败、超时和存储故障时的回退行为

use std::sync::Arc;
use std::time::{Duration, Instant};

use catalog_i18n::translation::{
    ErrorCategory, ResolutionOutcome, TranslationConfig, TranslationError, TranslationRecord,
    TranslationRecordStore, TranslationResolver,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{build_resolver, product_items, seeded_store, test_config, FlakyStore, MockProvider};

/// 提供者总是失败：返回源文本，且不写入存储和缓存
#[tokio::test]
async fn test_provider_failure_falls_back_without_poison_write() {
    let store = seeded_store(&[("tr", "greeting", "Merhaba")]);
    let provider = Arc::new(MockProvider::new().failing());
    let resolver = build_resolver(test_config(), store.clone(), provider.clone());

    let resolution = resolver.resolve_detailed("greeting", "en").await;
    assert_eq!(resolution.text, "Merhaba");
    assert_eq!(resolution.outcome, ResolutionOutcome::ProviderFallback);

    assert!(store.get("en", "greeting").await.unwrap().is_none());
    assert!(!resolver.cache().contains("en", "greeting"));

    let stats = resolver.stats();
    assert_eq!(stats.provider_failures, 1);
    assert_eq!(stats.fallbacks, 1);
}

/// 失败后提供者恢复，下一次解析会重新翻译
#[tokio::test]
async fn test_retry_after_provider_recovers() {
    let store = seeded_store(&[("tr", "greeting", "Merhaba")]);
    let provider = Arc::new(MockProvider::new().with_mapping("Merhaba", "Hello").failing());
    let resolver = build_resolver(test_config(), store.clone(), provider.clone());

    assert_eq!(resolver.resolve("greeting", "en").await, "Merhaba");

    provider.set_failing(false);
    assert_eq!(resolver.resolve("greeting", "en").await, "Hello");
    assert_eq!(provider.call_count(), 2);
    assert!(store.get("en", "greeting").await.unwrap().is_some());
}

/// 超时与失败同等处理
#[tokio::test]
async fn test_provider_timeout_is_fallback() {
    let store = seeded_store(&[("tr", "greeting", "Merhaba")]);
    let provider = Arc::new(MockProvider::new().with_delay(Duration::from_millis(500)));
    let config = TranslationConfig {
        provider_timeout_ms: 50,
        ..test_config()
    };
    let resolver = build_resolver(config, store.clone(), provider);

    let start = Instant::now();
    let resolution = resolver.resolve_detailed("greeting", "en").await;
    assert!(start.elapsed() < Duration::from_millis(400));

    assert_eq!(resolution.text, "Merhaba");
    assert_eq!(resolution.outcome, ResolutionOutcome::ProviderFallback);
    assert_eq!(resolver.stats().provider_timeouts, 1);
    assert!(store.get("en", "greeting").await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_timeout_falls_back_per_chunk() {
    let store = seeded_store(&[]);
    let provider = Arc::new(MockProvider::new().with_delay(Duration::from_millis(300)));
    let config = TranslationConfig {
        provider_timeout_ms: 30,
        chunk_size: 5,
        ..test_config()
    };
    let resolver = build_resolver(config, store.clone(), provider.clone());

    let items = product_items(10);
    let report = resolver.resolve_batch_detailed(items.clone(), "en").await;

    assert_eq!(report.len(), 10);
    assert_eq!(report.failed_chunks, 2);
    assert_eq!(provider.call_count(), 2);
    for item in &items {
        assert_eq!(report.translations[&item.key], item.source_text);
    }
    assert!(store.is_empty());
}

/// 提供者返回空译文时回退
#[tokio::test]
async fn test_empty_translation_is_rejected() {
    let store = seeded_store(&[("tr", "greeting", "Merhaba")]);
    let provider = Arc::new(MockProvider::new().with_mapping("Merhaba", "  "));
    let resolver = build_resolver(test_config(), store.clone(), provider);

    let resolution = resolver.resolve_detailed("greeting", "en").await;
    assert_eq!(resolution.text, "Merhaba");
    assert_eq!(resolution.outcome, ResolutionOutcome::ProviderFallback);
    assert!(store.get("en", "greeting").await.unwrap().is_none());
}

/// 存储读取失败时解析仍然返回文本
#[tokio::test]
async fn test_store_read_failure_degrades_gracefully() {
    let store = Arc::new(FlakyStore::new(vec![TranslationRecord::new(
        "tr", "greeting", "Merhaba",
    )]));
    store.set_fail_reads(true);
    let provider = Arc::new(MockProvider::new());
    let resolver = build_resolver(test_config(), store.clone(), provider.clone());

    let resolution = resolver.resolve_detailed("greeting", "en").await;
    assert_eq!(resolution.text, "greeting");
    assert_eq!(resolution.outcome, ResolutionOutcome::MissingSource);
    assert_eq!(provider.call_count(), 0);
    assert!(resolver.stats().store_errors >= 1);

    // 批量解析在读取失败时全部按待翻译处理
    let report = resolver.resolve_batch_detailed(product_items(3), "en").await;
    assert_eq!(report.len(), 3);
    assert_eq!(report.stored_hits, 0);
}

/// 写回失败时返回译文但不缓存，下次会重新尝试
#[tokio::test]
async fn test_store_write_failure_is_not_cached() {
    let store = Arc::new(FlakyStore::new(vec![TranslationRecord::new(
        "tr", "greeting", "Merhaba",
    )]));
    store.set_fail_writes(true);
    let provider = Arc::new(MockProvider::new().with_mapping("Merhaba", "Hello"));
    let resolver = build_resolver(test_config(), store.clone(), provider.clone());

    assert_eq!(resolver.resolve("greeting", "en").await, "Hello");
    assert!(!resolver.cache().contains("en", "greeting"));

    store.set_fail_writes(false);
    assert_eq!(resolver.resolve("greeting", "en").await, "Hello");
    assert_eq!(provider.call_count(), 2);
    assert_eq!(store.writes(), 1);
    assert!(resolver.cache().contains("en", "greeting"));
}

/// 管理端写入把存储错误暴露给调用方
#[tokio::test]
async fn test_admin_operations_propagate_store_errors() {
    let store = Arc::new(FlakyStore::new(Vec::new()));
    store.set_fail_writes(true);
    let resolver = build_resolver(test_config(), store, Arc::new(MockProvider::new()));

    let error = resolver
        .save_source_text("header.catalog", "Katalog", None)
        .await
        .unwrap_err();
    assert!(matches!(error, TranslationError::StoreError(_)));
    assert_eq!(error.category(), ErrorCategory::Store);

    let error = resolver.delete_key("header.catalog").await.unwrap_err();
    assert!(matches!(error, TranslationError::StoreError(_)));
}

#[test]
fn test_error_taxonomy() {
    let missing = TranslationError::MissingSourceText {
        language: "tr".to_string(),
        key: "greeting".to_string(),
    };
    assert!(!missing.is_retryable());
    assert!(!missing.is_provider_failure());

    let timeout = TranslationError::ProviderTimeout(Duration::from_secs(5));
    assert!(timeout.is_provider_failure());
    assert!(timeout.is_retryable());
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = TranslationConfig {
        chunk_size: 0,
        ..TranslationConfig::default()
    };
    let result = TranslationResolver::new(
        config,
        seeded_store(&[]),
        Arc::new(MockProvider::new()),
    );
    assert!(matches!(result, Err(TranslationError::ConfigError(_))));
}
