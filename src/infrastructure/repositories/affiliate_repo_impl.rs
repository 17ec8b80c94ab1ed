// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use crate::domain::models::affiliate::AffiliateEntry;
use crate::domain::repositories::{affiliate_repository::AffiliateRepository, RepositoryError};
use crate::infrastructure::database::entities::affiliate_entries;

impl From<affiliate_entries::Model> for AffiliateEntry {
    fn from(model: affiliate_entries::Model) -> Self {
        Self {
            id: model.id,
            product_name: model.product_name,
            keywords: AffiliateEntry::parse_keywords(&model.keywords),
            link_target: model.link_target,
            category: model.category,
            active: model.active,
        }
    }
}

/// 联盟商品仓库实现
#[derive(Clone)]
pub struct AffiliateRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl AffiliateRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AffiliateRepository for AffiliateRepositoryImpl {
    async fn find_active(&self) -> Result<Vec<AffiliateEntry>, RepositoryError> {
        let entries = affiliate_entries::Entity::find()
            .filter(affiliate_entries::Column::Active.eq(true))
            .order_by_asc(affiliate_entries::Column::Position)
            .order_by_asc(affiliate_entries::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(entries.into_iter().map(Into::into).collect())
    }
}
