// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::account::Plan;

/// 积分流水
///
/// 追加写入，不修改不删除。`balance_after - balance_before == amount` 恒成立。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i32,
    pub account_id: Uuid,
    pub amount: i64, // 正数为入账，负数为扣费
    pub kind: LedgerEntryKind,
    pub balance_before: i64,
    pub balance_after: i64,
    pub description: String,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

/// 流水类型
///
/// 推荐奖励按 `Purchase` 入账，描述中注明来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Usage,
    Purchase,
    SubscriptionGrant,
    Refund,
}

impl fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEntryKind::Usage => write!(f, "usage"),
            LedgerEntryKind::Purchase => write!(f, "purchase"),
            LedgerEntryKind::SubscriptionGrant => write!(f, "subscription_grant"),
            LedgerEntryKind::Refund => write!(f, "refund"),
        }
    }
}

impl FromStr for LedgerEntryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usage" => Ok(LedgerEntryKind::Usage),
            "purchase" => Ok(LedgerEntryKind::Purchase),
            "subscription_grant" => Ok(LedgerEntryKind::SubscriptionGrant),
            "refund" => Ok(LedgerEntryKind::Refund),
            _ => Err(()),
        }
    }
}

/// 一次余额变更的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceChange {
    pub balance_before: i64,
    pub balance_after: i64,
    /// 对应的流水ID；不计量套餐的扣费没有流水
    pub entry_id: Option<i32>,
    /// 为 true 时表示命中了已有的幂等键，本次没有产生新的变更
    pub replayed: bool,
}

impl BalanceChange {
    pub fn from_entry(entry: &LedgerEntry, replayed: bool) -> Self {
        Self {
            balance_before: entry.balance_before,
            balance_after: entry.balance_after,
            entry_id: Some(entry.id),
            replayed,
        }
    }

    pub fn unmetered(balance: i64) -> Self {
        Self {
            balance_before: balance,
            balance_after: balance,
            entry_id: None,
            replayed: false,
        }
    }

    /// 实际扣除的积分数（非负）
    pub fn charged(&self) -> i64 {
        (self.balance_before - self.balance_after).max(0)
    }
}

/// 账户余额视图
#[derive(Debug, Clone, Serialize)]
pub struct AccountBalance {
    pub credits: i64,
    pub plan: Plan,
    /// 按创建时间升序
    pub history: Vec<LedgerEntry>,
}
