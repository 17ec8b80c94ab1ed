// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Scriptmint-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Scriptmint-Timestamp";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),
    #[error("Invalid webhook timestamp")]
    InvalidTimestamp,
    #[error("Webhook timestamp outside tolerance")]
    Expired,
    #[error("Webhook signature mismatch")]
    Mismatch,
    #[error("Invalid webhook secret")]
    InvalidKey,
}

/// 支付回调签名校验
///
/// 签名为 `HMAC-SHA256(secret, "<timestamp>.<body>")` 的十六进制编码。
#[derive(Clone)]
pub struct WebhookSignatureVerifier {
    secret: String,
    tolerance_seconds: i64,
}

impl WebhookSignatureVerifier {
    pub fn new(secret: impl Into<String>, tolerance_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds,
        }
    }

    /// 为负载生成签名
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> Result<String, SignatureError> {
        let mac = self.mac(timestamp, body)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// 校验签名，`now` 为当前 Unix 时间戳（秒）
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

        let timestamp: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;
        if (now - timestamp).abs() > self.tolerance_seconds {
            return Err(SignatureError::Expired);
        }

        let expected = hex::decode(signature.trim()).map_err(|_| SignatureError::Mismatch)?;
        self.mac(timestamp, body)?
            .verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }

    fn mac(&self, timestamp: i64, body: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::InvalidKey)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }
}
