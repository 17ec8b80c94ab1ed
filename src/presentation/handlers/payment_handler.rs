// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{body::Bytes, http::HeaderMap, Extension, Json};
use std::sync::Arc;
use tracing::warn;

use crate::application::dto::payment_event::PaymentCompletedEvent;
use crate::application::use_cases::handle_payment::{HandlePaymentUseCase, PaymentOutcome};
use crate::infrastructure::services::webhook_signature::{
    WebhookSignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use crate::presentation::errors::AppError;

/// 支付完成回调
///
/// 先校验签名再解析负载；签名覆盖原始字节，所以这里不能用 `Json` 提取器。
pub async fn payment_completed(
    Extension(use_case): Extension<Arc<HandlePaymentUseCase>>,
    Extension(verifier): Extension<Arc<WebhookSignatureVerifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PaymentOutcome>, AppError> {
    if let Err(e) = verifier.verify(
        header_value(&headers, TIMESTAMP_HEADER),
        header_value(&headers, SIGNATURE_HEADER),
        &body,
        chrono::Utc::now().timestamp(),
    ) {
        warn!("Rejected payment webhook: {}", e);
        return Err(e.into());
    }

    let event: PaymentCompletedEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("Invalid payment event: {e}")))?;

    let outcome = use_case.execute(event).await?;
    Ok(Json(outcome))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
