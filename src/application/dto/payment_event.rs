// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 支付完成事件
///
/// 由支付渠道的回调推送，字段使用 camelCase。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompletedEvent {
    pub account_id: Option<Uuid>,
    pub account_email: Option<String>,
    pub amount_cents: i64,
    pub credits_granted: i64,
    /// 支付会话ID，作为入账的幂等键
    pub session_id: String,
    #[serde(default)]
    pub is_subscription: bool,
    pub plan_id: Option<String>,
}
