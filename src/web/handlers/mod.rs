//! Web 路由处理器

pub mod i18n;

pub use i18n::*;
