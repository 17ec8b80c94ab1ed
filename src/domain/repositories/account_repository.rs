// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::{ConditionalUpdateResult, RepositoryError};
use crate::domain::models::account::{Account, Plan};

/// 账户仓库特质
///
/// 不提供修改余额的方法，余额只能经由 [`super::credits_repository::CreditsRepository`] 变更。
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 创建账户
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError>;
    /// 根据ID查找账户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepositoryError>;
    /// 根据邮箱查找账户
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError>;
    /// 根据推荐码查找账户
    async fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>, RepositoryError>;
    /// 更新订阅套餐
    async fn update_plan(&self, id: Uuid, plan: Plan) -> Result<(), RepositoryError>;
    /// 仅当账户尚无推荐码时写入
    async fn assign_referral_code(
        &self,
        id: Uuid,
        code: &str,
    ) -> Result<ConditionalUpdateResult, RepositoryError>;
}
