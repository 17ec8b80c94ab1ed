// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::credits::{LedgerEntry, LedgerEntryKind};

#[derive(Error, Debug)]
pub enum CreditsRepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Insufficient credits: available {available}, required {required}")]
    InsufficientCredits { available: i64, required: i64 },
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
}

/// 待写入的余额变更
#[derive(Debug, Clone)]
pub struct LedgerRequest {
    pub account_id: Uuid,
    /// 变更幅度，恒为正数；方向由调用的方法决定
    pub amount: i64,
    pub kind: LedgerEntryKind,
    pub description: String,
    pub idempotency_key: Option<String>,
}

impl LedgerRequest {
    pub fn new(
        account_id: Uuid,
        amount: i64,
        kind: LedgerEntryKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            amount,
            kind,
            description: description.into(),
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// 扣费结果
#[derive(Debug, Clone)]
pub enum DebitOutcome {
    /// 扣费成功并写入了流水
    Debited(LedgerEntry),
    /// 幂等键已存在，返回之前的流水
    Replayed(LedgerEntry),
    /// 不计量套餐，余额未变
    Unmetered { balance: i64 },
}

/// 入账结果
#[derive(Debug, Clone)]
pub enum CreditOutcome {
    Credited(LedgerEntry),
    Replayed(LedgerEntry),
}

#[async_trait]
pub trait CreditsRepository: Send + Sync {
    /// 原子地检查并扣减余额，同时写入流水
    ///
    /// 余额不足时不做任何修改，返回 `InsufficientCredits`。
    async fn debit(&self, request: LedgerRequest) -> Result<DebitOutcome, CreditsRepositoryError>;

    /// 原子地增加余额，同时写入流水
    async fn credit(&self, request: LedgerRequest)
        -> Result<CreditOutcome, CreditsRepositoryError>;

    /// 根据幂等键查找流水
    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<LedgerEntry>, CreditsRepositoryError>;

    /// 获取账户流水，按创建时间升序
    async fn get_transaction_history(
        &self,
        account_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntry>, CreditsRepositoryError>;
}
