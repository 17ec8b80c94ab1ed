// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的 SeaORM 实现
pub mod account_repo_impl;
pub mod affiliate_repo_impl;
pub mod credits_repo_impl;
pub mod generation_log_repo_impl;
pub mod referral_repo_impl;
