// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub use sea_orm_migration::prelude::*;

mod m20260101_000001_create_accounts;
mod m20260101_000002_create_ledger_entries;
mod m20260101_000003_create_affiliate_entries;
mod m20260101_000004_create_referral_links;
mod m20260101_000005_create_generation_logs;

/// 数据库迁移器
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    /// 获取所有迁移，按执行顺序排列
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_accounts::Migration),
            Box::new(m20260101_000002_create_ledger_entries::Migration),
            Box::new(m20260101_000003_create_affiliate_entries::Migration),
            Box::new(m20260101_000004_create_referral_links::Migration),
            Box::new(m20260101_000005_create_generation_logs::Migration),
        ]
    }
}
