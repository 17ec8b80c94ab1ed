// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 账户（account）：积分余额与订阅套餐
/// - 积分流水（credits）：追加写入的余额变更记录
/// - 联盟商品（affiliate）：关键词与推广链接
/// - 推荐关系（referral）：推荐人与被推荐人之间的奖励状态
/// - 生成记录（generation）：每次脚本生成的结果
pub mod account;
pub mod affiliate;
pub mod credits;
pub mod generation;
pub mod referral;
