// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括关键词匹配、Markdown 受保护区间扫描和日志初始化
pub mod keyword_matcher;
pub mod markup_scanner;
pub mod telemetry;
