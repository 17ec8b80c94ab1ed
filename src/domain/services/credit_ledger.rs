// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::account::Account;
use crate::domain::models::credits::{
    AccountBalance, BalanceChange, LedgerEntry, LedgerEntryKind,
};
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::credits_repository::{
    CreditOutcome, CreditsRepository, CreditsRepositoryError, DebitOutcome, LedgerRequest,
};
use crate::domain::repositories::RepositoryError;

/// 积分账本错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient credits: available {available}, required {required}")]
    InsufficientCredits { available: i64, required: i64 },
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),
    #[error("Ledger store timed out after {0:?}")]
    StoreTimeout(Duration),
    #[error("Ledger store error: {0}")]
    Database(String),
}

impl From<CreditsRepositoryError> for LedgerError {
    fn from(err: CreditsRepositoryError) -> Self {
        match err {
            CreditsRepositoryError::InsufficientCredits {
                available,
                required,
            } => LedgerError::InsufficientCredits {
                available,
                required,
            },
            CreditsRepositoryError::AccountNotFound(id) => LedgerError::AccountNotFound(id),
            CreditsRepositoryError::Database(e) => LedgerError::Database(e.to_string()),
        }
    }
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        LedgerError::Database(err.to_string())
    }
}

/// 积分账本
///
/// 余额的唯一修改入口。并发控制完全依赖存储层的条件更新，这里不持有任何内存锁。
/// 所有存储调用都有超时；超时后不会自动重试扣费。
pub struct CreditLedger {
    credits_repository: Arc<dyn CreditsRepository>,
    account_repository: Arc<dyn AccountRepository>,
    store_timeout: Duration,
}

impl CreditLedger {
    pub fn new(
        credits_repository: Arc<dyn CreditsRepository>,
        account_repository: Arc<dyn AccountRepository>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            credits_repository,
            account_repository,
            store_timeout,
        }
    }

    /// 开户，赠送的注册积分直接写入余额，不产生流水
    pub async fn open_account(
        &self,
        email: Option<String>,
        name: Option<String>,
        signup_credits: i64,
    ) -> Result<Account, LedgerError> {
        let account = Account::new(email, name, signup_credits);
        let created = self
            .bounded(self.account_repository.create(&account))
            .await?;
        info!(account_id = %created.id, credits = created.credits, "Account opened");
        Ok(created)
    }

    /// 尝试扣费
    ///
    /// # 返回值
    ///
    /// * `Ok(BalanceChange)` - 扣费成功；不计量套餐时前后余额相同且没有流水
    /// * `Err(LedgerError::InsufficientCredits)` - 余额不足，余额保持不变
    pub async fn try_debit(&self, request: LedgerRequest) -> Result<BalanceChange, LedgerError> {
        Self::validate_amount(request.amount)?;
        let account_id = request.account_id;
        let amount = request.amount;

        match self.bounded(self.credits_repository.debit(request)).await {
            Ok(DebitOutcome::Debited(entry)) => {
                counter!("credits_debited_total").increment(amount as u64);
                debug!(
                    account_id = %account_id,
                    amount,
                    balance_after = entry.balance_after,
                    "Credits debited"
                );
                Ok(BalanceChange::from_entry(&entry, false))
            }
            Ok(DebitOutcome::Replayed(entry)) => {
                debug!(account_id = %account_id, entry_id = entry.id, "Debit replayed");
                Ok(BalanceChange::from_entry(&entry, true))
            }
            Ok(DebitOutcome::Unmetered { balance }) => Ok(BalanceChange::unmetered(balance)),
            Err(err @ LedgerError::InsufficientCredits { .. }) => {
                counter!("credits_insufficient_total").increment(1);
                warn!(account_id = %account_id, "{}", err);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// 入账，不检查余额；相同幂等键重复调用返回首次的结果
    pub async fn credit(&self, request: LedgerRequest) -> Result<BalanceChange, LedgerError> {
        Self::validate_amount(request.amount)?;
        let account_id = request.account_id;
        let amount = request.amount;
        let kind = request.kind;

        match self.bounded(self.credits_repository.credit(request)).await? {
            CreditOutcome::Credited(entry) => {
                counter!("credits_credited_total", "kind" => kind.to_string())
                    .increment(amount as u64);
                info!(
                    account_id = %account_id,
                    amount,
                    kind = %kind,
                    balance_after = entry.balance_after,
                    "Credits added"
                );
                Ok(BalanceChange::from_entry(&entry, false))
            }
            CreditOutcome::Replayed(entry) => {
                debug!(account_id = %account_id, entry_id = entry.id, "Credit replayed");
                Ok(BalanceChange::from_entry(&entry, true))
            }
        }
    }

    /// 补偿性退款
    pub async fn refund(
        &self,
        account_id: Uuid,
        amount: i64,
        description: impl Into<String>,
        idempotency_key: impl Into<String>,
    ) -> Result<BalanceChange, LedgerError> {
        let request = LedgerRequest::new(account_id, amount, LedgerEntryKind::Refund, description)
            .with_idempotency_key(idempotency_key);
        self.credit(request).await
    }

    /// 查询余额和流水
    pub async fn get_balance(
        &self,
        account_id: Uuid,
        history_limit: Option<u32>,
    ) -> Result<AccountBalance, LedgerError> {
        let account = self
            .bounded(self.account_repository.find_by_id(account_id))
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let history = self
            .bounded(
                self.credits_repository
                    .get_transaction_history(account_id, history_limit),
            )
            .await?;

        Ok(AccountBalance {
            credits: account.credits,
            plan: account.plan,
            history,
        })
    }

    /// 根据幂等键查找流水
    pub async fn find_entry(&self, idempotency_key: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        self.bounded(self.credits_repository.find_by_idempotency_key(idempotency_key))
            .await
    }

    /// 当前余额，不读取流水
    pub async fn current_credits(&self, account_id: Uuid) -> Result<i64, LedgerError> {
        self.bounded(self.account_repository.find_by_id(account_id))
            .await?
            .map(|account| account.credits)
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    fn validate_amount(amount: i64) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        Ok(())
    }

    async fn bounded<T, E, F>(&self, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<LedgerError>,
    {
        match timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                counter!("ledger_store_timeouts_total").increment(1);
                warn!("Ledger store call timed out after {:?}", self.store_timeout);
                Err(LedgerError::StoreTimeout(self.store_timeout))
            }
        }
    }
}
