// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 包含各个API端点的具体处理逻辑
pub mod account_handler;
pub mod catalog_handler;
pub mod credits_handler;
pub mod generation_handler;
pub mod payment_handler;
pub mod referral_handler;
