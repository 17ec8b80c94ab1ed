// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 账户实体
///
/// 积分余额只允许通过积分账本修改，账户本身不暴露直接写余额的入口。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// 账户唯一标识符
    pub id: Uuid,
    /// 支付回调按邮箱回查账户时使用
    pub email: Option<String>,
    /// 显示名称，生成推荐码前缀时使用
    pub name: Option<String>,
    /// 当前积分余额，计量套餐下恒为非负
    pub credits: i64,
    /// 订阅套餐
    pub plan: Plan,
    /// 账户自己的推荐码（首次请求时生成）
    pub referral_code: Option<String>,
    /// 推荐人账户ID
    pub referred_by: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Account {
    /// 创建一个新账户
    ///
    /// # 参数
    ///
    /// * `email` - 账户邮箱
    /// * `name` - 显示名称
    /// * `signup_credits` - 注册赠送积分
    pub fn new(email: Option<String>, name: Option<String>, signup_credits: i64) -> Self {
        let now = Utc::now().fixed_offset();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            credits: signup_credits.max(0),
            plan: Plan::Free,
            referral_code: None,
            referred_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 订阅套餐
///
/// 只有 `Unlimited` 不计量，其余套餐按次扣费。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Metered,
    Unlimited,
}

impl Plan {
    /// 是否按次计费
    pub fn is_metered(&self) -> bool {
        !matches!(self, Plan::Unlimited)
    }

    /// 将支付渠道的套餐标识映射为内部套餐
    ///
    /// 未知标识按免费套餐处理。
    pub fn from_plan_id(plan_id: &str) -> Self {
        match plan_id.trim().to_ascii_lowercase().as_str() {
            "agency" | "unlimited" => Plan::Unlimited,
            "pro" | "metered" => Plan::Metered,
            _ => Plan::Free,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Metered => write!(f, "metered"),
            Plan::Unlimited => write!(f, "unlimited"),
        }
    }
}

impl FromStr for Plan {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "metered" => Ok(Plan::Metered),
            "unlimited" => Ok(Plan::Unlimited),
            _ => Err(()),
        }
    }
}
