// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 推荐关系
///
/// 每个被推荐人最多一条；`reward_claimed` 只会从 false 变为 true。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralLink {
    pub id: Uuid,
    pub referrer_account_id: Uuid,
    pub referee_account_id: Uuid,
    pub reward_claimed: bool,
    pub credits_earned: i64,
    pub created_at: DateTime<FixedOffset>,
    pub rewarded_at: Option<DateTime<FixedOffset>>,
}

/// 推荐奖励评估结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReferralRewardOutcome {
    Rewarded { referrer_id: Uuid, credits: i64 },
    AlreadyClaimed,
    NoReferral,
}

/// 推荐统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferralStats {
    pub total_referrals: usize,
    pub successful_referrals: usize,
    pub total_credits_earned: i64,
    pub pending_rewards: usize,
}

impl ReferralStats {
    pub fn from_links(links: &[ReferralLink]) -> Self {
        let successful = links.iter().filter(|l| l.reward_claimed).count();
        Self {
            total_referrals: links.len(),
            successful_referrals: successful,
            total_credits_earned: links.iter().map(|l| l.credits_earned).sum(),
            pending_rewards: links.len() - successful,
        }
    }
}
