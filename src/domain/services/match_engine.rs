// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use super::affiliate_catalog::{AffiliateCatalog, CatalogError, CatalogItem};
use crate::domain::models::affiliate::{AffiliateEntry, AffiliateMatch};

/// 关键词匹配引擎
///
/// 在文本中查找命中的联盟条目：忽略大小写、整词匹配，每个条目最多命中一次，
/// 结果保持目录顺序。
pub struct MatchEngine {
    catalog: Arc<AffiliateCatalog>,
}

impl MatchEngine {
    pub fn new(catalog: Arc<AffiliateCatalog>) -> Self {
        Self { catalog }
    }

    /// 使用当前目录快照匹配文本
    pub async fn find_matches(&self, text: &str) -> Result<Vec<AffiliateMatch>, CatalogError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.catalog.get_active_entries().await?;
        Ok(match_items(snapshot.items(), text))
    }

    /// 不依赖缓存的匹配，直接使用给定的条目
    pub fn find_matches_in(entries: &[AffiliateEntry], text: &str) -> Vec<AffiliateMatch> {
        let items: Vec<CatalogItem> = entries.iter().cloned().map(CatalogItem::new).collect();
        match_items(&items, text)
    }
}

fn match_items(items: &[CatalogItem], text: &str) -> Vec<AffiliateMatch> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    items
        .iter()
        .filter(|item| item.patterns().iter().any(|p| p.is_match(text)))
        .map(|item| AffiliateMatch::from(&item.entry))
        .collect()
}
