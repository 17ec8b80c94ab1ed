// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Markdown 链接保护区扫描
//!
//! 计算文本中不允许被改写的字节区间：
//! - `[...]` 链接文本（支持嵌套方括号）
//! - 紧跟在 `]` 之后的 `(...)` 链接地址
//! - 裸露的 `http://` / `https://` 地址
//!
//! 反斜杠转义的方括号和圆括号按普通字符处理。所有区间边界都落在 ASCII 字符上，
//! 因此总是合法的 UTF-8 边界。

use std::ops::Range;

/// 受保护的字节区间集合，按起始位置升序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedSpans {
    spans: Vec<Range<usize>>,
}

impl ProtectedSpans {
    /// 给定区间是否与任一受保护区间相交
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.spans
            .iter()
            .any(|span| span.start < range.end && range.start < span.end)
    }

    pub fn as_slice(&self) -> &[Range<usize>] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// 扫描文本，返回所有受保护区间
pub fn scan(text: &str) -> ProtectedSpans {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut open_at = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(|b| is_escapable(*b)) => {
                i += 2;
                continue;
            }
            b'[' => {
                if depth == 0 {
                    open_at = i;
                }
                depth += 1;
            }
            b']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let mut end = i + 1;
                    if bytes.get(end) == Some(&b'(') {
                        end = destination_end(bytes, end);
                    }
                    spans.push(open_at..end);
                    i = end;
                    continue;
                }
            }
            b'h' if depth == 0 => {
                if let Some(end) = bare_url_end(text, i) {
                    spans.push(i..end);
                    i = end;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    // 未闭合的 '[' 保护到文本末尾
    if depth > 0 {
        spans.push(open_at..bytes.len());
    }

    ProtectedSpans { spans }
}

fn is_escapable(byte: u8) -> bool {
    matches!(byte, b'[' | b']' | b'(' | b')' | b'\\')
}

/// `start` 指向 '('，返回匹配的 ')' 之后的位置；未闭合时返回文本末尾
fn destination_end(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    bytes.len()
}

fn bare_url_end(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start..];
    if !(rest.starts_with("http://") || rest.starts_with("https://")) {
        return None;
    }

    let preceded_by_word = text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    if preceded_by_word {
        return None;
    }

    let len = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"'))
        .unwrap_or(rest.len());
    Some(start + len)
}
