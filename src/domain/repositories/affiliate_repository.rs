// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::models::affiliate::AffiliateEntry;

/// 联盟商品仓库特质
///
/// 只读；商品的增删改由外部管理流程负责。
#[async_trait]
pub trait AffiliateRepository: Send + Sync {
    /// 读取所有启用的商品，按目录顺序返回
    async fn find_active(&self) -> Result<Vec<AffiliateEntry>, RepositoryError>;
}
