// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    models::{account::Plan, credits::LedgerEntry},
    repositories::{
        credits_repository::{
            CreditOutcome, CreditsRepository, CreditsRepositoryError, DebitOutcome, LedgerRequest,
        },
        is_unique_violation, ConditionalUpdateResult,
    },
};
use crate::infrastructure::database::entities::{accounts, ledger_entries};

/// 无法识别的流水类型视为数据损坏，直接报错
impl TryFrom<ledger_entries::Model> for LedgerEntry {
    type Error = DbErr;

    fn try_from(model: ledger_entries::Model) -> Result<Self, Self::Error> {
        let kind = model.kind.parse().map_err(|_| {
            DbErr::Type(format!(
                "unknown ledger entry kind '{}' on entry {}",
                model.kind, model.id
            ))
        })?;

        Ok(Self {
            id: model.id,
            account_id: model.account_id,
            amount: model.amount,
            kind,
            balance_before: model.balance_before,
            balance_after: model.balance_after,
            description: model.description,
            idempotency_key: model.idempotency_key,
            created_at: model.created_at,
        })
    }
}

/// 积分仓库实现
///
/// 每次余额变更都在一个事务内完成：先执行带条件的 UPDATE，
/// 再在同一事务内读取变更后的余额并写入流水。事务的第一条语句总是写操作。
#[derive(Clone)]
pub struct CreditsRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CreditsRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn apply_debit(
        txn: &DatabaseTransaction,
        request: &LedgerRequest,
    ) -> Result<DebitOutcome, CreditsRepositoryError> {
        // credits >= amount 与扣减在同一条语句里完成
        let update: ConditionalUpdateResult = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Credits,
                Expr::col(accounts::Column::Credits).sub(request.amount),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts::Column::Id.eq(request.account_id))
            .filter(accounts::Column::Credits.gte(request.amount))
            .filter(accounts::Column::Plan.ne(Plan::Unlimited.to_string()))
            .exec(txn)
            .await?
            .into();

        if !update.applied() {
            let account = accounts::Entity::find_by_id(request.account_id)
                .one(txn)
                .await?
                .ok_or(CreditsRepositoryError::AccountNotFound(request.account_id))?;

            if account.plan == Plan::Unlimited.to_string() {
                return Ok(DebitOutcome::Unmetered {
                    balance: account.credits,
                });
            }

            return Err(CreditsRepositoryError::InsufficientCredits {
                available: account.credits,
                required: request.amount,
            });
        }

        let balance_after = Self::balance_of(txn, request.account_id).await?;
        let entry = Self::append_entry(txn, request, -request.amount, balance_after).await?;
        Ok(DebitOutcome::Debited(entry))
    }

    async fn apply_credit(
        txn: &DatabaseTransaction,
        request: &LedgerRequest,
    ) -> Result<CreditOutcome, CreditsRepositoryError> {
        let update: ConditionalUpdateResult = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Credits,
                Expr::col(accounts::Column::Credits).add(request.amount),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts::Column::Id.eq(request.account_id))
            .exec(txn)
            .await?
            .into();

        if !update.applied() {
            return Err(CreditsRepositoryError::AccountNotFound(request.account_id));
        }

        let balance_after = Self::balance_of(txn, request.account_id).await?;
        let entry = Self::append_entry(txn, request, request.amount, balance_after).await?;
        Ok(CreditOutcome::Credited(entry))
    }

    async fn balance_of(
        txn: &DatabaseTransaction,
        account_id: Uuid,
    ) -> Result<i64, CreditsRepositoryError> {
        accounts::Entity::find_by_id(account_id)
            .one(txn)
            .await?
            .map(|account| account.credits)
            .ok_or(CreditsRepositoryError::AccountNotFound(account_id))
    }

    async fn append_entry(
        txn: &DatabaseTransaction,
        request: &LedgerRequest,
        signed_amount: i64,
        balance_after: i64,
    ) -> Result<LedgerEntry, CreditsRepositoryError> {
        let entry = ledger_entries::ActiveModel {
            id: NotSet,
            account_id: Set(request.account_id),
            amount: Set(signed_amount),
            kind: Set(request.kind.to_string()),
            balance_before: Set(balance_after - signed_amount),
            balance_after: Set(balance_after),
            description: Set(request.description.clone()),
            idempotency_key: Set(request.idempotency_key.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        Ok(entry.insert(txn).await?.try_into()?)
    }

    /// 提交或回滚事务
    ///
    /// 出错时必须先回滚再使用连接池里的其他连接。
    async fn finish<T>(
        txn: DatabaseTransaction,
        result: Result<T, CreditsRepositoryError>,
    ) -> Result<T, CreditsRepositoryError> {
        match result {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(err) => {
                txn.rollback().await?;
                Err(err)
            }
        }
    }

    /// 并发写入相同幂等键时，输掉竞争的一方返回胜出方的流水
    async fn resolve_conflict(
        &self,
        request: &LedgerRequest,
        err: CreditsRepositoryError,
    ) -> Result<LedgerEntry, CreditsRepositoryError> {
        let conflicted = matches!(&err, CreditsRepositoryError::Database(db_err) if is_unique_violation(db_err));
        match (conflicted, request.idempotency_key.as_deref()) {
            (true, Some(key)) => match self.find_by_idempotency_key(key).await? {
                Some(prior) => {
                    if prior.account_id != request.account_id {
                        warn!(
                            "Idempotency key {} reused across accounts ({} vs {})",
                            key, prior.account_id, request.account_id
                        );
                    }
                    Ok(prior)
                }
                None => Err(err),
            },
            _ => Err(err),
        }
    }
}

#[async_trait]
impl CreditsRepository for CreditsRepositoryImpl {
    async fn debit(&self, request: LedgerRequest) -> Result<DebitOutcome, CreditsRepositoryError> {
        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(prior) = self.find_by_idempotency_key(key).await? {
                return Ok(DebitOutcome::Replayed(prior));
            }
        }

        let txn = self.db.begin().await?;
        let result = Self::apply_debit(&txn, &request).await;
        match Self::finish(txn, result).await {
            Err(err @ CreditsRepositoryError::Database(_)) => self
                .resolve_conflict(&request, err)
                .await
                .map(DebitOutcome::Replayed),
            other => other,
        }
    }

    async fn credit(
        &self,
        request: LedgerRequest,
    ) -> Result<CreditOutcome, CreditsRepositoryError> {
        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(prior) = self.find_by_idempotency_key(key).await? {
                return Ok(CreditOutcome::Replayed(prior));
            }
        }

        let txn = self.db.begin().await?;
        let result = Self::apply_credit(&txn, &request).await;
        match Self::finish(txn, result).await {
            Err(err @ CreditsRepositoryError::Database(_)) => self
                .resolve_conflict(&request, err)
                .await
                .map(CreditOutcome::Replayed),
            other => other,
        }
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<LedgerEntry>, CreditsRepositoryError> {
        let entry = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::IdempotencyKey.eq(key))
            .one(self.db.as_ref())
            .await?;

        Ok(entry.map(LedgerEntry::try_from).transpose()?)
    }

    async fn get_transaction_history(
        &self,
        account_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntry>, CreditsRepositoryError> {
        // 取最近的 N 条，再翻转为升序
        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account_id))
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .order_by_desc(ledger_entries::Column::Id);

        if let Some(limit) = limit {
            query = query.limit(limit as u64);
        }

        let mut entries = query
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        entries.reverse();

        Ok(entries)
    }
}
