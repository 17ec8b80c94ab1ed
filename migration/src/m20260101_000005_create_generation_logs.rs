// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_accounts::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GenerationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GenerationLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GenerationLogs::AccountId).uuid().not_null())
                    .col(ColumnDef::new(GenerationLogs::Topic).text().not_null())
                    .col(ColumnDef::new(GenerationLogs::TargetAudience).text())
                    .col(ColumnDef::new(GenerationLogs::Tone).string())
                    .col(ColumnDef::new(GenerationLogs::GeneratedScript).text())
                    .col(
                        ColumnDef::new(GenerationLogs::CreditsUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GenerationLogs::AffiliateLinksInserted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GenerationLogs::Status).string().not_null())
                    .col(ColumnDef::new(GenerationLogs::ErrorMessage).text())
                    .col(
                        ColumnDef::new(GenerationLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generation_logs_account")
                            .from(GenerationLogs::Table, GenerationLogs::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_generation_logs_account")
                    .table(GenerationLogs::Table)
                    .col(GenerationLogs::AccountId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GenerationLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GenerationLogs {
    Table,
    Id,
    AccountId,
    Topic,
    TargetAudience,
    Tone,
    GeneratedScript,
    CreditsUsed,
    AffiliateLinksInserted,
    Status,
    ErrorMessage,
    CreatedAt,
}
