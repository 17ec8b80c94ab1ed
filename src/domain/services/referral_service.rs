// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::credit_ledger::{CreditLedger, LedgerError};
use crate::domain::models::credits::LedgerEntryKind;
use crate::domain::models::referral::{ReferralLink, ReferralRewardOutcome, ReferralStats};
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::credits_repository::LedgerRequest;
use crate::domain::repositories::referral_repository::{
    ReferralRepository, ReferralRepositoryError,
};
use crate::domain::repositories::RepositoryError;

/// 默认推荐奖励积分
pub const DEFAULT_REFERRAL_REWARD: i64 = 5;

const CODE_SUFFIX_LEN: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_ALLOCATION_ATTEMPTS: usize = 5;

#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("Invalid referral code")]
    InvalidReferralCode,
    #[error("You cannot use your own referral code")]
    SelfReferral,
    #[error("A referral code has already been applied to this account")]
    AlreadyReferred,
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Referral store error: {0}")]
    Database(String),
}

impl From<ReferralRepositoryError> for ReferralError {
    fn from(err: ReferralRepositoryError) -> Self {
        match err {
            ReferralRepositoryError::AlreadyReferred(_) => ReferralError::AlreadyReferred,
            ReferralRepositoryError::AccountNotFound(id) => ReferralError::AccountNotFound(id),
            ReferralRepositoryError::Database(e) => ReferralError::Database(e.to_string()),
        }
    }
}

impl From<RepositoryError> for ReferralError {
    fn from(err: RepositoryError) -> Self {
        ReferralError::Database(err.to_string())
    }
}

/// 推荐服务
///
/// 负责推荐码的发放与使用，以及被推荐人首次付费后给推荐人发放奖励。
/// 奖励发放有两道保护：带幂等键的入账，以及只在未领取时生效的条件更新。
pub struct ReferralService {
    referral_repository: Arc<dyn ReferralRepository>,
    account_repository: Arc<dyn AccountRepository>,
    ledger: Arc<CreditLedger>,
    reward_credits: i64,
}

impl ReferralService {
    pub fn new(
        referral_repository: Arc<dyn ReferralRepository>,
        account_repository: Arc<dyn AccountRepository>,
        ledger: Arc<CreditLedger>,
        reward_credits: i64,
    ) -> Self {
        Self {
            referral_repository,
            account_repository,
            ledger,
            reward_credits,
        }
    }

    /// 评估并发放推荐奖励
    ///
    /// 重复或并发触发时最多只发放一次；只有完成状态翻转的调用返回 `Rewarded`。
    pub async fn evaluate(&self, referee_id: Uuid) -> Result<ReferralRewardOutcome, ReferralError> {
        let Some(link) = self.referral_repository.find_by_referee(referee_id).await? else {
            return Ok(ReferralRewardOutcome::NoReferral);
        };

        if link.reward_claimed {
            return Ok(ReferralRewardOutcome::AlreadyClaimed);
        }

        let request = LedgerRequest::new(
            link.referrer_account_id,
            self.reward_credits,
            LedgerEntryKind::Purchase,
            "Referral bonus - friend made first purchase",
        )
        .with_idempotency_key(format!("referral-reward:{}", link.id));
        self.ledger.credit(request).await?;

        let flipped = self
            .referral_repository
            .mark_rewarded(link.id, self.reward_credits)
            .await?;

        if !flipped.applied() {
            return Ok(ReferralRewardOutcome::AlreadyClaimed);
        }

        counter!("referral_rewards_total").increment(1);
        info!(
            referrer_id = %link.referrer_account_id,
            referee_id = %referee_id,
            credits = self.reward_credits,
            "Referral reward granted"
        );

        Ok(ReferralRewardOutcome::Rewarded {
            referrer_id: link.referrer_account_id,
            credits: self.reward_credits,
        })
    }

    /// 使用推荐码
    pub async fn apply_referral_code(
        &self,
        referee_id: Uuid,
        code: &str,
    ) -> Result<ReferralLink, ReferralError> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ReferralError::InvalidReferralCode);
        }

        let referrer = self
            .account_repository
            .find_by_referral_code(&code)
            .await?
            .ok_or(ReferralError::InvalidReferralCode)?;

        if referrer.id == referee_id {
            return Err(ReferralError::SelfReferral);
        }

        let link = self
            .referral_repository
            .create_link(referrer.id, referee_id)
            .await?;

        info!(
            referrer_id = %referrer.id,
            referee_id = %referee_id,
            "Referral code applied"
        );
        Ok(link)
    }

    /// 获取账户的推荐码，没有时生成一个
    pub async fn get_or_create_referral_code(&self, account_id: Uuid) -> Result<String, ReferralError> {
        let account = self
            .account_repository
            .find_by_id(account_id)
            .await?
            .ok_or(ReferralError::AccountNotFound(account_id))?;

        if let Some(code) = account.referral_code {
            return Ok(code);
        }

        for _ in 0..CODE_ALLOCATION_ATTEMPTS {
            let code = generate_referral_code(account.name.as_deref());
            match self
                .account_repository
                .assign_referral_code(account_id, &code)
                .await
            {
                Ok(update) if update.applied() => return Ok(code),
                Ok(_) => {
                    // 并发请求已经写入了推荐码
                    return self
                        .account_repository
                        .find_by_id(account_id)
                        .await?
                        .and_then(|account| account.referral_code)
                        .ok_or(ReferralError::AccountNotFound(account_id));
                }
                Err(RepositoryError::AlreadyExists) => {
                    warn!("Referral code collision on {}, regenerating", code);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ReferralError::Database(
            "could not allocate a unique referral code".to_string(),
        ))
    }

    pub async fn list_referrals(&self, referrer_id: Uuid) -> Result<Vec<ReferralLink>, ReferralError> {
        Ok(self.referral_repository.list_by_referrer(referrer_id).await?)
    }

    pub async fn stats(&self, referrer_id: Uuid) -> Result<ReferralStats, ReferralError> {
        let links = self.list_referrals(referrer_id).await?;
        Ok(ReferralStats::from_links(&links))
    }
}

/// 生成推荐码：名字前四个字符中的大写字母（没有时用 USER）加六位随机字符
pub fn generate_referral_code(name: Option<&str>) -> String {
    let prefix: String = name
        .unwrap_or_default()
        .chars()
        .take(4)
        .flat_map(char::to_uppercase)
        .filter(char::is_ascii_uppercase)
        .collect();
    let prefix = if prefix.is_empty() {
        "USER".to_string()
    } else {
        prefix
    };

    let mut rng = rand::rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect();

    format!("{prefix}{suffix}")
}
