// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AffiliateEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AffiliateEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AffiliateEntries::ProductName).string().not_null())
                    .col(ColumnDef::new(AffiliateEntries::Keywords).text().not_null())
                    .col(ColumnDef::new(AffiliateEntries::LinkTarget).text().not_null())
                    .col(ColumnDef::new(AffiliateEntries::Category).string())
                    .col(
                        ColumnDef::new(AffiliateEntries::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AffiliateEntries::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AffiliateEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AffiliateEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_affiliate_entries_active_position")
                    .table(AffiliateEntries::Table)
                    .col(AffiliateEntries::Active)
                    .col(AffiliateEntries::Position)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AffiliateEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AffiliateEntries {
    Table,
    Id,
    ProductName,
    Keywords,
    LinkTarget,
    Category,
    Active,
    Position,
    CreatedAt,
    UpdatedAt,
}
