// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::referral::ReferralLink;
use crate::domain::repositories::{
    is_unique_violation,
    referral_repository::{ReferralRepository, ReferralRepositoryError},
    ConditionalUpdateResult,
};
use crate::infrastructure::database::entities::{accounts, referral_links};

impl From<referral_links::Model> for ReferralLink {
    fn from(model: referral_links::Model) -> Self {
        Self {
            id: model.id,
            referrer_account_id: model.referrer_account_id,
            referee_account_id: model.referee_account_id,
            reward_claimed: model.reward_claimed,
            credits_earned: model.credits_earned,
            created_at: model.created_at,
            rewarded_at: model.rewarded_at,
        }
    }
}

/// 推荐仓库实现
#[derive(Clone)]
pub struct ReferralRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ReferralRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn insert_link(
        txn: &DatabaseTransaction,
        referrer_id: Uuid,
        referee_id: Uuid,
    ) -> Result<ReferralLink, ReferralRepositoryError> {
        let update: ConditionalUpdateResult = accounts::Entity::update_many()
            .col_expr(accounts::Column::ReferredBy, Expr::value(referrer_id))
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts::Column::Id.eq(referee_id))
            .filter(accounts::Column::ReferredBy.is_null())
            .exec(txn)
            .await?
            .into();

        if !update.applied() {
            let exists = accounts::Entity::find_by_id(referee_id)
                .one(txn)
                .await?
                .is_some();
            return Err(if exists {
                ReferralRepositoryError::AlreadyReferred(referee_id)
            } else {
                ReferralRepositoryError::AccountNotFound(referee_id)
            });
        }

        let link = referral_links::ActiveModel {
            id: Set(Uuid::new_v4()),
            referrer_account_id: Set(referrer_id),
            referee_account_id: Set(referee_id),
            reward_claimed: Set(false),
            credits_earned: Set(0),
            created_at: Set(Utc::now().fixed_offset()),
            rewarded_at: Set(None),
        };

        Ok(link.insert(txn).await?.into())
    }
}

#[async_trait]
impl ReferralRepository for ReferralRepositoryImpl {
    async fn create_link(
        &self,
        referrer_id: Uuid,
        referee_id: Uuid,
    ) -> Result<ReferralLink, ReferralRepositoryError> {
        let txn = self.db.begin().await?;
        match Self::insert_link(&txn, referrer_id, referee_id).await {
            Ok(link) => {
                txn.commit().await?;
                Ok(link)
            }
            Err(err) => {
                txn.rollback().await?;
                match err {
                    ReferralRepositoryError::Database(db_err) if is_unique_violation(&db_err) => {
                        Err(ReferralRepositoryError::AlreadyReferred(referee_id))
                    }
                    other => Err(other),
                }
            }
        }
    }

    async fn find_by_referee(
        &self,
        referee_id: Uuid,
    ) -> Result<Option<ReferralLink>, ReferralRepositoryError> {
        let link = referral_links::Entity::find()
            .filter(referral_links::Column::RefereeAccountId.eq(referee_id))
            .one(self.db.as_ref())
            .await?;
        Ok(link.map(Into::into))
    }

    async fn mark_rewarded(
        &self,
        link_id: Uuid,
        credits: i64,
    ) -> Result<ConditionalUpdateResult, ReferralRepositoryError> {
        let result = referral_links::Entity::update_many()
            .col_expr(referral_links::Column::RewardClaimed, Expr::value(true))
            .col_expr(referral_links::Column::CreditsEarned, Expr::value(credits))
            .col_expr(
                referral_links::Column::RewardedAt,
                Expr::value(Some(Utc::now().fixed_offset())),
            )
            .filter(referral_links::Column::Id.eq(link_id))
            .filter(referral_links::Column::RewardClaimed.eq(false))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.into())
    }

    async fn list_by_referrer(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<ReferralLink>, ReferralRepositoryError> {
        let links = referral_links::Entity::find()
            .filter(referral_links::Column::ReferrerAccountId.eq(referrer_id))
            .order_by_desc(referral_links::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(links.into_iter().map(Into::into).collect())
    }
}
