// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;

use crate::domain::models::affiliate::{AffiliateMatch, InjectionResult};
use crate::utils::keyword_matcher::KeywordPattern;
use crate::utils::markup_scanner;

/// 联盟链接注入器
///
/// 对每个命中条目，按关键词顺序找到第一个"可用"的出现位置，替换为
/// `[商品名](链接)` 后即处理下一个条目。位于已有链接文本或链接地址内的出现位置不可用。
/// 每次插入后重新扫描，新插入的链接同样受保护；文本中已有指向同一地址的链接时
/// 跳过该条目，因此重复执行不会再插入。
pub struct LinkInjector;

impl LinkInjector {
    pub fn apply(text: &str, matches: &[AffiliateMatch]) -> InjectionResult {
        let mut updated = text.to_string();
        let mut inserted_count = 0;

        for affiliate in matches {
            // 每个商品最多一条链接，已有同一地址的链接时跳过
            if updated.contains(&format!("]({})", escape_destination(&affiliate.link_target))) {
                continue;
            }

            let protected = markup_scanner::scan(&updated);
            let occurrence = affiliate
                .keywords
                .iter()
                .filter_map(|keyword| KeywordPattern::new(keyword))
                .find_map(|pattern| {
                    pattern
                        .find_iter(&updated)
                        .find(|range| !protected.overlaps(range))
                });

            if let Some(range) = occurrence {
                updated.replace_range(range, &render_link(affiliate));
                inserted_count += 1;
            }
        }

        if inserted_count > 0 {
            counter!("affiliate_links_inserted_total").increment(inserted_count as u64);
        }

        InjectionResult {
            updated_text: updated,
            inserted_count,
        }
    }
}

fn render_link(affiliate: &AffiliateMatch) -> String {
    format!(
        "[{}]({})",
        escape_link_text(&affiliate.product_name),
        escape_destination(&affiliate.link_target)
    )
}

// 链接文本里的方括号需要转义，否则会破坏嵌套
fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn escape_destination(url: &str) -> String {
    url.trim()
        .replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
}

#[cfg(test)]
#[path = "link_injector_test.rs"]
mod tests;
