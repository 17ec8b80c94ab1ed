// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 文本生成请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPrompt {
    pub topic: String,
    pub target_audience: Option<String>,
    pub tone: Option<String>,
}

#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("Text generation failed: {0}")]
    Failed(String),
    #[error("Text generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Text generator is not configured")]
    NotConfigured,
}

/// 文本生成服务
///
/// 外部协作方，具体实现见 `infrastructure::services::llm_text_generator`。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError>;
}
