// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 一次脚本生成的记录，成功失败都会写入
#[derive(Debug, Clone, Serialize)]
pub struct GenerationLog {
    pub id: Uuid,
    pub account_id: Uuid,
    pub topic: String,
    pub target_audience: Option<String>,
    pub tone: Option<String>,
    /// 注入联盟链接后的最终脚本，失败时为空
    pub generated_script: Option<String>,
    pub affiliate_links_inserted: i32,
    pub credits_used: i64,
    pub status: GenerationStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl GenerationLog {
    pub fn new(id: Uuid, account_id: Uuid, topic: String, status: GenerationStatus) -> Self {
        Self {
            id,
            account_id,
            topic,
            target_audience: None,
            tone: None,
            generated_script: None,
            affiliate_links_inserted: 0,
            credits_used: 0,
            status,
            error_message: None,
            created_at: Utc::now().fixed_offset(),
        }
    }
}

/// 生成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    Success,
    Failed,
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenerationStatus::Success => write!(f, "success"),
            GenerationStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for GenerationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(GenerationStatus::Success),
            "failed" => Ok(GenerationStatus::Failed),
            _ => Err(()),
        }
    }
}
