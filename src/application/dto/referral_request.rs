// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 使用推荐码请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ApplyReferralCodeRequestDto {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}
