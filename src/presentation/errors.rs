// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::generate_script::GenerateScriptError;
use crate::application::use_cases::handle_payment::PaymentError;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::credit_ledger::LedgerError;
use crate::domain::services::referral_service::ReferralError;
use crate::infrastructure::services::webhook_signature::SignatureError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// 请求参数错误
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(anyhow::Error::new(BadRequest(message.into())))
    }

    fn classify(&self) -> (StatusCode, &'static str, String) {
        if let Some(e) = self.0.downcast_ref::<BadRequest>() {
            return (StatusCode::BAD_REQUEST, "INVALID_REQUEST", e.0.clone());
        }
        if let Some(e) = self.0.downcast_ref::<GenerateScriptError>() {
            return match e {
                GenerateScriptError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
                }
                GenerateScriptError::Ledger(ledger) => Self::ledger_status(ledger),
                GenerateScriptError::Generation(_) => (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "Script generation failed, please try again".to_string(),
                ),
            };
        }
        if let Some(e) = self.0.downcast_ref::<LedgerError>() {
            return Self::ledger_status(e);
        }
        if let Some(e) = self.0.downcast_ref::<ReferralError>() {
            return match e {
                ReferralError::InvalidReferralCode => {
                    (StatusCode::BAD_REQUEST, "INVALID_REFERRAL_CODE", e.to_string())
                }
                ReferralError::SelfReferral => {
                    (StatusCode::BAD_REQUEST, "SELF_REFERRAL", e.to_string())
                }
                ReferralError::AlreadyReferred => {
                    (StatusCode::CONFLICT, "ALREADY_REFERRED", e.to_string())
                }
                ReferralError::AccountNotFound(_) => {
                    (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND", "Account not found".to_string())
                }
                ReferralError::Ledger(ledger) => Self::ledger_status(ledger),
                ReferralError::Database(_) => Self::internal(),
            };
        }
        if let Some(e) = self.0.downcast_ref::<PaymentError>() {
            return match e {
                PaymentError::Ledger(ledger) => Self::ledger_status(ledger),
                PaymentError::Repository(RepositoryError::NotFound) => {
                    (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND", "Account not found".to_string())
                }
                PaymentError::Repository(_) => Self::internal(),
            };
        }
        if let Some(e) = self.0.downcast_ref::<SignatureError>() {
            return (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE", e.to_string());
        }
        if let Some(e) = self.0.downcast_ref::<RepositoryError>() {
            return match e {
                RepositoryError::NotFound => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found".to_string())
                }
                RepositoryError::AlreadyExists => {
                    (StatusCode::CONFLICT, "ALREADY_EXISTS", e.to_string())
                }
                RepositoryError::Database(_) => Self::internal(),
            };
        }
        Self::internal()
    }

    fn ledger_status(err: &LedgerError) -> (StatusCode, &'static str, String) {
        match err {
            LedgerError::InsufficientCredits { .. } => (
                StatusCode::PRECONDITION_FAILED,
                "INSUFFICIENT_CREDITS",
                "Not enough credits. Purchase more credits or upgrade your plan".to_string(),
            ),
            LedgerError::AccountNotFound(_) => {
                (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND", "Account not found".to_string())
            }
            LedgerError::InvalidAmount(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.to_string())
            }
            LedgerError::StoreTimeout(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "LEDGER_UNAVAILABLE",
                "Credit ledger is temporarily unavailable".to_string(),
            ),
            LedgerError::Database(_) => Self::internal(),
        }
    }

    fn internal() -> (StatusCode, &'static str, String) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error".to_string(),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "success": false, "code": code, "error": message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct BadRequest(String);
