// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::generation::GenerationLog;
use crate::domain::repositories::{
    generation_log_repository::GenerationLogRepository, RepositoryError,
};
use crate::infrastructure::database::entities::generation_logs;

impl From<generation_logs::Model> for GenerationLog {
    fn from(model: generation_logs::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            topic: model.topic,
            target_audience: model.target_audience,
            tone: model.tone,
            generated_script: model.generated_script,
            affiliate_links_inserted: model.affiliate_links_inserted,
            credits_used: model.credits_used,
            status: model.status.parse().unwrap_or_default(),
            error_message: model.error_message,
            created_at: model.created_at,
        }
    }
}

/// 生成记录仓库实现
#[derive(Clone)]
pub struct GenerationLogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl GenerationLogRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GenerationLogRepository for GenerationLogRepositoryImpl {
    async fn create(&self, log: &GenerationLog) -> Result<(), RepositoryError> {
        let model = generation_logs::ActiveModel {
            id: Set(log.id),
            account_id: Set(log.account_id),
            topic: Set(log.topic.clone()),
            target_audience: Set(log.target_audience.clone()),
            tone: Set(log.tone.clone()),
            generated_script: Set(log.generated_script.clone()),
            credits_used: Set(log.credits_used),
            affiliate_links_inserted: Set(log.affiliate_links_inserted),
            status: Set(log.status.to_string()),
            error_message: Set(log.error_message.clone()),
            created_at: Set(log.created_at),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_account(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> Result<Vec<GenerationLog>, RepositoryError> {
        let logs = generation_logs::Entity::find()
            .filter(generation_logs::Column::AccountId.eq(account_id))
            .order_by_desc(generation_logs::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(logs.into_iter().map(Into::into).collect())
    }
}
