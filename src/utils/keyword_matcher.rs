// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::Regex;
use std::ops::Range;
use tracing::warn;

/// 关键词匹配模式
///
/// 忽略大小写，按整词或整短语匹配。关键词首尾是单词字符时才加 `\b` 边界，
/// 这样 `c++` 之类以符号结尾的关键词也能命中。
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    keyword: String,
    regex: Regex,
}

impl KeywordPattern {
    /// 编译关键词，空白关键词返回 `None`
    pub fn new(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return None;
        }

        let mut pattern = String::from("(?i)");
        if keyword.chars().next().is_some_and(is_word_char) {
            pattern.push_str(r"\b");
        }
        pattern.push_str(&regex::escape(&keyword));
        if keyword.chars().next_back().is_some_and(is_word_char) {
            pattern.push_str(r"\b");
        }

        match Regex::new(&pattern) {
            Ok(regex) => Some(Self { keyword, regex }),
            Err(e) => {
                warn!("Skipping keyword {:?}: {}", keyword, e);
                None
            }
        }
    }

    /// 批量编译，跳过空白关键词，保持顺序
    pub fn compile_all(keywords: &[String]) -> Vec<Self> {
        keywords.iter().filter_map(|k| Self::new(k)).collect()
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// 按出现顺序返回所有命中区间
    pub fn find_iter<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        self.regex.find_iter(text).map(|m| m.range())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
