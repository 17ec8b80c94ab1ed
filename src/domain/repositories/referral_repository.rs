// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use super::ConditionalUpdateResult;
use crate::domain::models::referral::ReferralLink;

#[derive(Error, Debug)]
pub enum ReferralRepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Account {0} has already been referred")]
    AlreadyReferred(Uuid),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
}

/// 推荐仓库特质
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// 建立推荐关系，同时记录被推荐人的推荐人
    async fn create_link(
        &self,
        referrer_id: Uuid,
        referee_id: Uuid,
    ) -> Result<ReferralLink, ReferralRepositoryError>;

    /// 查找被推荐人的推荐关系
    async fn find_by_referee(
        &self,
        referee_id: Uuid,
    ) -> Result<Option<ReferralLink>, ReferralRepositoryError>;

    /// 仅当奖励尚未领取时标记为已领取
    async fn mark_rewarded(
        &self,
        link_id: Uuid,
        credits: i64,
    ) -> Result<ConditionalUpdateResult, ReferralRepositoryError>;

    /// 列出推荐人的所有推荐关系，按创建时间倒序
    async fn list_by_referrer(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<ReferralLink>, ReferralRepositoryError>;
}
