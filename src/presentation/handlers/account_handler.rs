// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

use crate::application::dto::account_request::CreateAccountRequestDto;
use crate::config::settings::Settings;
use crate::domain::services::credit_ledger::CreditLedger;
use crate::domain::services::referral_service::{ReferralError, ReferralService};
use crate::presentation::errors::AppError;

/// 开户
///
/// 携带推荐码时同时建立推荐关系；推荐码无效不会导致开户失败，结果中返回 `referral_applied`。
pub async fn create_account(
    Extension(ledger): Extension<Arc<CreditLedger>>,
    Extension(referrals): Extension<Arc<ReferralService>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(payload): Json<CreateAccountRequestDto>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let account = ledger
        .open_account(
            payload.email.map(|e| e.trim().to_lowercase()),
            payload.name,
            settings.ledger.signup_credits,
        )
        .await?;

    let mut referral_applied = false;
    if let Some(code) = payload.referral_code.as_deref() {
        match referrals.apply_referral_code(account.id, code).await {
            Ok(_) => referral_applied = true,
            Err(e @ (ReferralError::InvalidReferralCode | ReferralError::SelfReferral)) => {
                warn!(account_id = %account.id, "Referral code ignored at signup: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "account": account,
            "referral_applied": referral_applied,
        })),
    ))
}
