//! 翻译键约定
//!
//! 实体绑定的键格式为 `<entity_type>.<entity_id>.<field>`，例如
//! `product.2210.name`、`category.led-urunler.name`；自由界面键为
//! `<namespace>.<leaf>`，例如 `header.catalog`。
//!
//! 历史数据中 `<entity_id>` 段可能是 UUID、SKU 或 slug。新写入的键一律使用
//! UUID（见 [`EntityKey::canonical`]），其余形态只为兼容旧数据而解析。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::translation::error::{TranslationError, TranslationResult};

/// 键的分隔符
pub const KEY_SEPARATOR: char = '.';

/// 实体类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Product,
    Category,
    /// 其他命名空间（解析旧数据时保留原样）
    Other(String),
}

impl EntityType {
    /// 键中的类型段
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Product => "product",
            EntityType::Category => "category",
            EntityType::Other(name) => name.as_str(),
        }
    }

    /// 从键中的类型段解析
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "product" => EntityType::Product,
            "category" => EntityType::Category,
            other => EntityType::Other(other.to_string()),
        }
    }

    /// 是否为可被搜索索引反查的目录实体
    pub fn is_catalog_entity(&self) -> bool {
        matches!(self, EntityType::Product | EntityType::Category)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 标识符段的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentifierKind {
    /// 稳定的 UUID 标识符
    Uuid,
    /// SKU 或 slug，例如 `2210`、`led-urunler`、`LED-P60`
    Slug,
    /// 其他无法识别的形态
    Other,
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]+(?:[-_][A-Za-z0-9]+)*$").expect("slug pattern is valid")
    })
}

/// 判断标识符段的形态
pub fn classify_identifier(id: &str) -> IdentifierKind {
    if is_uuid(id) {
        IdentifierKind::Uuid
    } else if slug_pattern().is_match(id) {
        IdentifierKind::Slug
    } else {
        IdentifierKind::Other
    }
}

/// 标识符段是否为 UUID（只接受带连字符的标准形式）
pub fn is_uuid(id: &str) -> bool {
    id.len() == 36 && Uuid::parse_str(id).is_ok()
}

/// 解析后的实体键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub entity_type: EntityType,
    pub entity_id: String,
    /// 字段，可以包含多个段（例如 `spec.power`）
    pub field: String,
}

impl EntityKey {
    /// 创建实体键，校验各段不为空且类型、标识符中不含分隔符
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        field: impl Into<String>,
    ) -> TranslationResult<Self> {
        let entity_id = entity_id.into();
        let field = field.into();

        let type_segment = entity_type.as_str();
        if type_segment.is_empty() || type_segment.contains(KEY_SEPARATOR) {
            return Err(TranslationError::InvalidKey(format!(
                "实体类型段无效: '{}'",
                type_segment
            )));
        }
        if entity_id.is_empty() || entity_id.contains(KEY_SEPARATOR) {
            return Err(TranslationError::InvalidKey(format!(
                "实体标识符段无效: '{}'",
                entity_id
            )));
        }
        if field.is_empty() || field.split(KEY_SEPARATOR).any(str::is_empty) {
            return Err(TranslationError::InvalidKey(format!("字段段无效: '{}'", field)));
        }

        Ok(Self {
            entity_type,
            entity_id,
            field,
        })
    }

    /// 使用规范 UUID 标识符创建实体键
    pub fn canonical(
        entity_type: EntityType,
        id: Uuid,
        field: impl Into<String>,
    ) -> TranslationResult<Self> {
        Self::new(entity_type, id.hyphenated().to_string(), field)
    }

    /// 标识符段的形态
    pub fn identifier_kind(&self) -> IdentifierKind {
        classify_identifier(&self.entity_id)
    }

    /// 生成完整的翻译键
    pub fn to_key(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.entity_type.as_str(),
            self.entity_id,
            self.field,
            sep = KEY_SEPARATOR
        )
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

/// 构建实体键
pub fn build_entity_key(
    entity_type: EntityType,
    entity_id: &str,
    field: &str,
) -> TranslationResult<String> {
    EntityKey::new(entity_type, entity_id, field).map(|key| key.to_key())
}

/// 解析实体键；不是 `<type>.<id>.<field>` 形式时返回 `None`
pub fn parse_entity_key(key: &str) -> Option<EntityKey> {
    let mut segments = key.splitn(3, KEY_SEPARATOR);
    let entity_type = segments.next()?;
    let entity_id = segments.next()?;
    let field = segments.next()?;

    EntityKey::new(EntityType::from_segment(entity_type), entity_id, field).ok()
}

/// 实体类型对应的键前缀，例如 `product.`
pub fn entity_prefix(entity_type: &EntityType) -> String {
    format!("{}{}", entity_type.as_str(), KEY_SEPARATOR)
}
