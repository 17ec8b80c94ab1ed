// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::generation::GenerationLog;

#[async_trait]
pub trait GenerationLogRepository: Send + Sync {
    async fn create(&self, log: &GenerationLog) -> Result<(), RepositoryError>;
    async fn find_by_account(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> Result<Vec<GenerationLog>, RepositoryError>;
}
