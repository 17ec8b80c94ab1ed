// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::dto::payment_event::PaymentCompletedEvent;
use crate::domain::models::account::{Account, Plan};
use crate::domain::models::credits::LedgerEntryKind;
use crate::domain::models::referral::ReferralRewardOutcome;
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::credits_repository::LedgerRequest;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::credit_ledger::{CreditLedger, LedgerError};
use crate::domain::services::referral_service::ReferralService;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 支付处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Ignored {
        reason: String,
    },
    SubscriptionActivated {
        account_id: Uuid,
        plan: Plan,
        credits_granted: i64,
        balance_after: i64,
        referral: Option<ReferralRewardOutcome>,
    },
    CreditsPurchased {
        account_id: Uuid,
        credits_granted: i64,
        balance_after: i64,
        replayed: bool,
        referral: Option<ReferralRewardOutcome>,
    },
}

/// 支付完成处理用例
///
/// 以支付会话ID作为入账幂等键，重复推送的回调不会重复入账。
pub struct HandlePaymentUseCase {
    ledger: Arc<CreditLedger>,
    account_repository: Arc<dyn AccountRepository>,
    referral_service: Arc<ReferralService>,
}

impl HandlePaymentUseCase {
    pub fn new(
        ledger: Arc<CreditLedger>,
        account_repository: Arc<dyn AccountRepository>,
        referral_service: Arc<ReferralService>,
    ) -> Self {
        Self {
            ledger,
            account_repository,
            referral_service,
        }
    }

    pub async fn execute(&self, event: PaymentCompletedEvent) -> Result<PaymentOutcome, PaymentError> {
        let Some(account) = self.resolve_account(&event).await? else {
            warn!(session_id = %event.session_id, "Payment for unknown account ignored");
            return Ok(PaymentOutcome::Ignored {
                reason: "unknown account".to_string(),
            });
        };

        if event.is_subscription {
            return self.activate_subscription(account, event).await;
        }

        if event.credits_granted <= 0 {
            warn!(session_id = %event.session_id, "Payment without credits ignored");
            return Ok(PaymentOutcome::Ignored {
                reason: "no credits granted".to_string(),
            });
        }

        let request = LedgerRequest::new(
            account.id,
            event.credits_granted,
            LedgerEntryKind::Purchase,
            format!("Purchased {} credits", event.credits_granted),
        )
        .with_idempotency_key(payment_key(&event.session_id));
        let change = self.ledger.credit(request).await?;

        info!(
            account_id = %account.id,
            session_id = %event.session_id,
            credits = event.credits_granted,
            amount_cents = event.amount_cents,
            "Credit purchase completed"
        );

        let referral = self.reward_referrer(account.id).await;
        Ok(PaymentOutcome::CreditsPurchased {
            account_id: account.id,
            credits_granted: event.credits_granted,
            balance_after: change.balance_after,
            replayed: change.replayed,
            referral,
        })
    }

    async fn activate_subscription(
        &self,
        account: Account,
        event: PaymentCompletedEvent,
    ) -> Result<PaymentOutcome, PaymentError> {
        let plan = Plan::from_plan_id(event.plan_id.as_deref().unwrap_or("pro"));
        self.account_repository.update_plan(account.id, plan).await?;

        let mut balance_after = account.credits;
        if event.credits_granted > 0 {
            let request = LedgerRequest::new(
                account.id,
                event.credits_granted,
                LedgerEntryKind::SubscriptionGrant,
                format!("Subscription: {} plan", plan),
            )
            .with_idempotency_key(payment_key(&event.session_id));
            balance_after = self.ledger.credit(request).await?.balance_after;
        }

        info!(
            account_id = %account.id,
            session_id = %event.session_id,
            plan = %plan,
            "Subscription activated"
        );

        let referral = self.reward_referrer(account.id).await;
        Ok(PaymentOutcome::SubscriptionActivated {
            account_id: account.id,
            plan,
            credits_granted: event.credits_granted.max(0),
            balance_after,
            referral,
        })
    }

    async fn resolve_account(&self, event: &PaymentCompletedEvent) -> Result<Option<Account>, PaymentError> {
        if let Some(account_id) = event.account_id {
            if let Some(account) = self.account_repository.find_by_id(account_id).await? {
                return Ok(Some(account));
            }
        }

        match event.account_email.as_deref() {
            Some(email) if !email.trim().is_empty() => {
                Ok(self.account_repository.find_by_email(email.trim()).await?)
            }
            _ => Ok(None),
        }
    }

    /// 推荐奖励失败只记录日志，不影响支付处理
    async fn reward_referrer(&self, referee_id: Uuid) -> Option<ReferralRewardOutcome> {
        match self.referral_service.evaluate(referee_id).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(referee_id = %referee_id, "Referral reward failed: {}", e);
                None
            }
        }
    }
}

fn payment_key(session_id: &str) -> String {
    format!("payment:{session_id}")
}
