// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 脚本生成请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct GenerateScriptRequestDto {
    /// 视频主题
    #[validate(length(min = 3, max = 500))]
    pub topic: String,

    /// 目标受众
    #[validate(length(max = 500))]
    pub target_audience: Option<String>,

    /// 语气风格
    #[validate(length(max = 50))]
    pub tone: Option<String>,

    /// 客户端请求ID，同一ID的重试只扣费一次
    #[validate(length(min = 1, max = 128))]
    pub request_id: Option<String>,
}

/// 脚本生成响应DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateScriptResponseDto {
    pub success: bool,
    pub generation_id: Uuid,
    pub script: String,
    pub credits_used: i64,
    pub credits_remaining: i64,
    pub links_inserted: usize,
}
