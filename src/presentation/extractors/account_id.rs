// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

pub const ACCOUNT_ID_HEADER: &str = "X-Account-Id";

/// 从 `X-Account-Id` 请求头解析的账户ID
#[derive(Debug, Clone, Copy)]
pub struct AccountId(pub Uuid);

impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACCOUNT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(AccountId)
            .ok_or_else(|| {
                let body = Json(json!({
                    "success": false,
                    "code": "INVALID_ACCOUNT",
                    "error": "Missing or invalid X-Account-Id header"
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            })
    }
}
