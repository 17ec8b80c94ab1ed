// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 联盟商品条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateEntry {
    pub id: Uuid,
    pub product_name: String,
    /// 已去空白、转小写、去空值，保持原始顺序
    pub keywords: Vec<String>,
    pub link_target: String,
    pub category: Option<String>,
    pub active: bool,
}

impl AffiliateEntry {
    /// 解析逗号分隔的关键词字段
    pub fn parse_keywords(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// 文本中命中的联盟条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliateMatch {
    pub entry_id: Uuid,
    pub product_name: String,
    pub link_target: String,
    pub category: Option<String>,
    pub keywords: Vec<String>,
}

impl From<&AffiliateEntry> for AffiliateMatch {
    fn from(entry: &AffiliateEntry) -> Self {
        Self {
            entry_id: entry.id,
            product_name: entry.product_name.clone(),
            link_target: entry.link_target.clone(),
            category: entry.category.clone(),
            keywords: entry.keywords.clone(),
        }
    }
}

/// 链接注入结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionResult {
    pub updated_text: String,
    pub inserted_count: usize,
}
