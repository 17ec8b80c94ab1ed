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
                    .table(ReferralLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReferralLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReferralLinks::ReferrerAccountId).uuid().not_null())
                    .col(ColumnDef::new(ReferralLinks::RefereeAccountId).uuid().not_null())
                    .col(
                        ColumnDef::new(ReferralLinks::RewardClaimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ReferralLinks::CreditsEarned)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReferralLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReferralLinks::RewardedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_referral_links_referrer")
                            .from(ReferralLinks::Table, ReferralLinks::ReferrerAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_referral_links_referee")
                            .from(ReferralLinks::Table, ReferralLinks::RefereeAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个被推荐人最多一条推荐关系
        manager
            .create_index(
                Index::create()
                    .name("idx_referral_links_referee")
                    .table(ReferralLinks::Table)
                    .col(ReferralLinks::RefereeAccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_referral_links_referrer")
                    .table(ReferralLinks::Table)
                    .col(ReferralLinks::ReferrerAccountId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReferralLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ReferralLinks {
    Table,
    Id,
    ReferrerAccountId,
    RefereeAccountId,
    RewardClaimed,
    CreditsEarned,
    CreatedAt,
    RewardedAt,
}
