// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施服务模块
///
/// 提供外部服务的具体实现
/// 包括 LLM 文本生成和支付回调签名校验
pub mod llm_text_generator;
pub mod webhook_signature;
