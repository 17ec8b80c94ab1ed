// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务，这些服务封装了复杂的
/// 业务规则和领域逻辑，协调多个领域对象来完成业务操作。
///
/// 包含的服务：
/// - 积分账本（credit_ledger）：原子扣费、入账、退款和余额查询
/// - 联盟商品目录（affiliate_catalog）：带 TTL 的进程内目录快照
/// - 匹配引擎（match_engine）：在文本中查找命中的联盟商品
/// - 链接注入器（link_injector）：把命中的关键词改写为链接
/// - 推荐服务（referral_service）：推荐码和推荐奖励
/// - 文本生成（text_generator）：外部文本生成服务的抽象
pub mod affiliate_catalog;
pub mod credit_ledger;
pub mod link_injector;
pub mod match_engine;
pub mod referral_service;
pub mod text_generator;
