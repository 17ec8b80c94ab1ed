// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 开户请求DTO
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct CreateAccountRequestDto {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 100))]
    pub name: Option<String>,

    /// 注册时使用的推荐码
    #[validate(length(min = 1, max = 32))]
    pub referral_code: Option<String>,
}
