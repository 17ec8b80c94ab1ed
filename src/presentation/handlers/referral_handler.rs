// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::application::dto::referral_request::ApplyReferralCodeRequestDto;
use crate::domain::services::referral_service::ReferralService;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::account_id::AccountId;

pub async fn get_referral_code(
    Extension(referrals): Extension<Arc<ReferralService>>,
    AccountId(account_id): AccountId,
) -> Result<Json<Value>, AppError> {
    let code = referrals.get_or_create_referral_code(account_id).await?;
    Ok(Json(json!({ "success": true, "code": code })))
}

pub async fn apply_referral_code(
    Extension(referrals): Extension<Arc<ReferralService>>,
    AccountId(account_id): AccountId,
    Json(payload): Json<ApplyReferralCodeRequestDto>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let link = referrals
        .apply_referral_code(account_id, &payload.code)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "referral": link })),
    ))
}

pub async fn list_referrals(
    Extension(referrals): Extension<Arc<ReferralService>>,
    AccountId(account_id): AccountId,
) -> Result<Json<Value>, AppError> {
    let links = referrals.list_referrals(account_id).await?;
    Ok(Json(json!({ "success": true, "referrals": links })))
}

pub async fn referral_stats(
    Extension(referrals): Extension<Arc<ReferralService>>,
    AccountId(account_id): AccountId,
) -> Result<Json<Value>, AppError> {
    let stats = referrals.stats(account_id).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}
