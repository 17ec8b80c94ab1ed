// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::account::{Account, Plan};
use crate::domain::repositories::{
    account_repository::AccountRepository, is_unique_violation, ConditionalUpdateResult,
    RepositoryError,
};
use crate::infrastructure::database::entities::accounts;

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            credits: model.credits,
            plan: model.plan.parse().unwrap_or_default(),
            referral_code: model.referral_code,
            referred_by: model.referred_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Account> for accounts::ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: Set(account.id),
            email: Set(account.email.clone()),
            name: Set(account.name.clone()),
            credits: Set(account.credits),
            plan: Set(account.plan.to_string()),
            referral_code: Set(account.referral_code.clone()),
            referred_by: Set(account.referred_by),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        }
    }
}

/// 账户仓库实现
#[derive(Clone)]
pub struct AccountRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl AccountRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountRepositoryImpl {
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError> {
        let model: accounts::ActiveModel = account.into();
        match model.insert(self.db.as_ref()).await {
            Ok(created) => Ok(created.into()),
            Err(err) if is_unique_violation(&err) => Err(RepositoryError::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepositoryError> {
        let account = accounts::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(account.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;
        Ok(account.map(Into::into))
    }

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>, RepositoryError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::ReferralCode.eq(code))
            .one(self.db.as_ref())
            .await?;
        Ok(account.map(Into::into))
    }

    async fn update_plan(&self, id: Uuid, plan: Plan) -> Result<(), RepositoryError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Plan, Expr::value(plan.to_string()))
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn assign_referral_code(
        &self,
        id: Uuid,
        code: &str,
    ) -> Result<ConditionalUpdateResult, RepositoryError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::ReferralCode, Expr::value(code))
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts::Column::Id.eq(id))
            .filter(accounts::Column::ReferralCode.is_null())
            .exec(self.db.as_ref())
            .await;

        match result {
            Ok(result) => Ok(result.into()),
            Err(err) if is_unique_violation(&err) => Err(RepositoryError::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }
}
