// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Query, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::services::credit_ledger::CreditLedger;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::account_id::AccountId;

const DEFAULT_HISTORY_LIMIT: u32 = 50;
const MAX_HISTORY_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct CreditsQuery {
    pub limit: Option<u32>,
}

/// 查询余额、套餐和最近的流水
pub async fn get_credits(
    Extension(ledger): Extension<Arc<CreditLedger>>,
    AccountId(account_id): AccountId,
    Query(query): Query<CreditsQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    let balance = ledger.get_balance(account_id, Some(limit)).await?;

    Ok(Json(json!({
        "success": true,
        "credits": balance.credits,
        "plan": balance.plan,
        "history": balance.history,
    })))
}
