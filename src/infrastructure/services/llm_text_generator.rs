// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::domain::services::text_generator::{GenerationError, GenerationPrompt, TextGenerator};

/// LLM 文本生成 - 对接 OpenAI 兼容的 chat completions 接口
///
/// # 配置
///
/// 通过 `llm` 配置段设置：
/// - `api_key` - API 密钥，未配置时每次调用返回 `NotConfigured`
/// - `model` - 模型名称
/// - `api_base_url` - API 基础地址
pub struct LlmTextGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
}

impl LlmTextGenerator {
    pub fn new(
        api_key: Option<String>,
        model: String,
        api_base_url: String,
        request_timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GenerationError::Failed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn user_message(prompt: &GenerationPrompt) -> String {
        let mut message = format!("Topic: {}", prompt.topic);
        if let Some(audience) = prompt.target_audience.as_deref() {
            message.push_str(&format!("\nTarget audience: {audience}"));
        }
        if let Some(tone) = prompt.tone.as_deref() {
            message.push_str(&format!("\nTone: {tone}"));
        }
        message
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(GenerationError::NotConfigured)?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You write short-form video scripts."
                },
                {
                    "role": "user",
                    "content": Self::user_message(prompt)
                }
            ]
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerationError::Failed(format!("request to LLM API failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Failed(format!(
                "LLM API returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Failed(format!("invalid LLM API response: {e}")))?;

        if let Some(usage) = body.get("usage") {
            debug!(
                prompt_tokens = usage["prompt_tokens"].as_u64().unwrap_or(0),
                completion_tokens = usage["completion_tokens"].as_u64().unwrap_or(0),
                "LLM usage"
            );
        }

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::Failed("LLM API returned no content".to_string()))
    }
}
