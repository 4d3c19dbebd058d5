//! 实体搜索索引集成测试

use std::sync::Arc;

use catalog_i18n::translation::{EntitySearchIndex, EntityType, IdentifierKind, TranslationRecord};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{seeded_store, FlakyStore};

const PANEL_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

#[tokio::test]
async fn test_reverse_maps_uuid_product() {
    let key = format!("product.{}.name", PANEL_ID);
    let store = seeded_store(&[("en", key.as_str(), "LED Panel")]);
    let index = EntitySearchIndex::new(store);

    let results = index.search("LED", "en").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entity_type, EntityType::Product);
    assert_eq!(results[0].entity_id, PANEL_ID);
    assert_eq!(results[0].field, "name");
    assert_eq!(results[0].id_kind, IdentifierKind::Uuid);
    assert_eq!(results[0].matched_value, "LED Panel");
}

/// UUID 层有结果时不返回 slug 层
#[tokio::test]
async fn test_uuid_tier_takes_precedence() {
    let key = format!("product.{}.name", PANEL_ID);
    let store = seeded_store(&[
        ("en", key.as_str(), "LED Panel"),
        ("en", "product.2210.name", "LED Spot"),
        ("en", "category.led-urunler.name", "LED Products"),
    ]);
    let index = EntitySearchIndex::new(store);

    let results = index.search("led", "en").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entity_id, PANEL_ID);
}

/// 没有 UUID 命中时退回 SKU/slug 层
#[tokio::test]
async fn test_slug_tier_fallback() {
    let store = seeded_store(&[
        ("en", "product.2210.name", "LED Spot"),
        ("en", "category.led-urunler.name", "LED Products"),
        ("en", "category.outdoor.name", "Outdoor"),
    ]);
    let index = EntitySearchIndex::new(store);

    let results = index.search("LED", "en").await.unwrap();
    let ids: Vec<_> = results
        .iter()
        .map(|m| (m.entity_type.clone(), m.entity_id.as_str()))
        .collect();
    assert_eq!(
        ids,
        vec![
            (EntityType::Product, "2210"),
            (EntityType::Category, "led-urunler"),
        ]
    );
    assert!(results.iter().all(|m| m.id_kind == IdentifierKind::Slug));
}

/// 含土耳其语字母的旧 slug 同样可以被反查
#[tokio::test]
async fn test_non_ascii_slug_is_matched() {
    let store = seeded_store(&[
        ("en", "category.aydınlatma.name", "LED Lighting"),
        ("en", "product.led-ürünler-60.name", "LED Panel 60"),
    ]);
    let index = EntitySearchIndex::new(store);

    let results = index.search("LED", "en").await.unwrap();
    let ids: Vec<_> = results.iter().map(|m| m.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["led-ürünler-60", "aydınlatma"]);
    assert!(results.iter().all(|m| m.id_kind == IdentifierKind::Other));

    let categories = index
        .search_type("lighting", "en", EntityType::Category)
        .await
        .unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].entity_id, "aydınlatma");
}

/// 值不匹配时按标识符前缀匹配
#[tokio::test]
async fn test_prefix_tier_matches_sku_prefix() {
    let store = seeded_store(&[
        ("en", "product.LED-P60.name", "Ceiling light"),
        ("en", "product.LED-P60.description", "Square ceiling light"),
        ("en", "product.SPOT-1.name", "Spot"),
    ]);
    let index = EntitySearchIndex::new(store);

    let results = index.search("LED-P", "en").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entity_id, "LED-P60");
}

#[tokio::test]
async fn test_no_match_returns_empty() {
    let store = seeded_store(&[("en", "product.2210.name", "LED Spot")]);
    let index = EntitySearchIndex::new(store);

    assert!(index.search("halogen bulb", "en").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_type_filter() {
    let store = seeded_store(&[
        ("en", "product.2210.name", "LED Spot"),
        ("en", "category.led-urunler.name", "LED Products"),
    ]);
    let index = EntitySearchIndex::new(store);

    let results = index
        .search_type("LED", "en", EntityType::Category)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entity_id, "led-urunler");
}

/// 只搜索指定语言，忽略自由界面键
#[tokio::test]
async fn test_language_scope_and_free_form_keys() {
    let store = seeded_store(&[
        ("tr", "product.2210.name", "LED Spot Lamba"),
        ("en", "header.led", "LED lighting"),
        ("en", "menu.main.title", "LED menu"),
    ]);
    let index = EntitySearchIndex::new(store);

    assert!(index.search("LED", "en").await.unwrap().is_empty());
    assert_eq!(index.search("lamba", "tr").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let store = Arc::new(FlakyStore::new(vec![TranslationRecord::new(
        "en",
        "product.2210.name",
        "LED Spot",
    )]));
    store.set_fail_reads(true);
    let index = EntitySearchIndex::new(store);

    assert!(index.search("LED", "en").await.is_err());
}
